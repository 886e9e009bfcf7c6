//! Listener and connection introspection.
//!
//! [`ListenerDecorator`] and [`ConnectionDecorator`] wrap a listener or a
//! connection and run optional *before* and *after* hooks around every
//! operation: accept, read, write, close, address queries and deadlines.
//! Before hooks may veto a call; after hooks observe the real outcome.
//!
//! Connections produced by a decorated listener start with no hooks, and
//! the listener's after-accept hook can install hooks on each one, so
//! instrumentation can differ per connection (sampling, for instance) and
//! change at any point of its lifetime.
//!
//! ```no_run
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//! use connxray::net::{ListenerDecorator, TcpAcceptor};
//!
//! let mut listener = ListenerDecorator::new(TcpAcceptor::bind("127.0.0.1:0")?);
//! let total = Arc::new(AtomicU64::new(0));
//! let counter = Arc::clone(&total);
//! listener.set_after_accept(move |_, accepted| {
//!     if let Ok(conn) = accepted {
//!         let counter = Arc::clone(&counter);
//!         conn.set_after_read(move |_, _, read| {
//!             if let Ok(n) = read {
//!                 counter.fetch_add(*n as u64, Ordering::Relaxed);
//!             }
//!         });
//!     }
//! });
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod monitor;
pub mod net;
pub mod observability;

pub use config::MonitorConfig;
pub use monitor::StatsTracker;
pub use net::{
    is_not_packet_connection, Addr, Connection, ConnectionDecorator, Listener, ListenerDecorator,
    NotPacketConnection, PacketConnection,
};
