//! Hook signatures for the listener and connection decorators.
//!
//! A *before* hook sees an operation's inputs and may veto the call by
//! returning an error; the wrapped operation and its *after* hook are then
//! skipped and the caller receives that error. An *after* hook sees the
//! inputs together with the actual outcome and cannot change it.
//!
//! Hooks are reference-counted so one callback can be shared between many
//! decorators, and `Send + Sync` so decorated objects can move to worker
//! threads. Connection hooks receive the wrapped connection; listener hooks
//! receive the decorator itself.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use super::addr::Addr;
use super::connection::ConnectionDecorator;
use super::listener::ListenerDecorator;
use super::transport::Listener;

/// Gate for a listener operation (`accept`, `close`).
pub type ListenerGate<L> = Arc<dyn Fn(&ListenerDecorator<L>) -> io::Result<()> + Send + Sync>;

/// Observer for `accept`; receives the freshly wrapped connection on success.
pub type AfterAccept<L> = Arc<
    dyn Fn(&ListenerDecorator<L>, Result<&mut ConnectionDecorator<<L as Listener>::Conn>, &io::Error>)
        + Send
        + Sync,
>;

/// Observer for listener `close`.
pub type AfterListenerClose<L> = Arc<dyn Fn(&ListenerDecorator<L>, &io::Result<()>) + Send + Sync>;

/// Observer for listener `addr`.
pub type AfterListenerAddr<L> = Arc<dyn Fn(&ListenerDecorator<L>, Option<&Addr>) + Send + Sync>;

/// Gate for `read`/`write`, and for `read_from`; receives the buffer.
pub type BeforeIo<C> = Arc<dyn Fn(&C, &[u8]) -> io::Result<()> + Send + Sync>;

/// Observer for `read`/`write`; receives the buffer and the byte count.
pub type AfterIo<C> = Arc<dyn Fn(&C, &[u8], &io::Result<usize>) + Send + Sync>;

/// Observer for `read_from`; receives the buffer, byte count and sender.
pub type AfterReadFrom<C> = Arc<dyn Fn(&C, &[u8], &io::Result<(usize, Addr)>) + Send + Sync>;

/// Gate for `write_to`.
pub type BeforeWriteTo<C> = Arc<dyn Fn(&C, &[u8], &Addr) -> io::Result<()> + Send + Sync>;

/// Observer for `write_to`.
pub type AfterWriteTo<C> = Arc<dyn Fn(&C, &[u8], &Addr, &io::Result<usize>) + Send + Sync>;

/// Gate for connection `close`.
pub type BeforeClose<C> = Arc<dyn Fn(&C) -> io::Result<()> + Send + Sync>;

/// Observer for connection `close`.
pub type AfterClose<C> = Arc<dyn Fn(&C, &io::Result<()>) + Send + Sync>;

/// Observer for `local_addr`/`remote_addr`.
pub type AfterAddr<C> = Arc<dyn Fn(&C, Option<&Addr>) + Send + Sync>;

/// Gate for the three deadline setters.
pub type BeforeDeadline<C> = Arc<dyn Fn(&C, Option<Instant>) -> io::Result<()> + Send + Sync>;

/// Observer for the three deadline setters.
pub type AfterDeadline<C> = Arc<dyn Fn(&C, Option<Instant>, &io::Result<()>) + Send + Sync>;
