//! Listener decorator.
//!
//! # Responsibilities
//! - Forward accept/close/addr to the wrapped listener
//! - Wrap every accepted connection in a fresh [`ConnectionDecorator`]
//! - Hand that decorator to the after-accept hook so it can install
//!   per-connection hooks before anyone else sees the connection

use std::fmt;
use std::io;
use std::sync::Arc;

use super::addr::Addr;
use super::connection::ConnectionDecorator;
use super::hooks::{AfterAccept, AfterListenerAddr, AfterListenerClose, ListenerGate};
use super::transport::Listener;

/// Wraps a [`Listener`] and runs hooks around each of its operations.
///
/// The decorator is itself a [`Listener`], producing
/// [`ConnectionDecorator`]s, so it can be handed to any serving loop that
/// takes a plain listener.
pub struct ListenerDecorator<L: Listener> {
    inner: L,

    pub before_accept: Option<ListenerGate<L>>,
    pub after_accept: Option<AfterAccept<L>>,
    pub before_close: Option<ListenerGate<L>>,
    pub after_close: Option<AfterListenerClose<L>>,
    pub after_addr: Option<AfterListenerAddr<L>>,
}

impl<L: Listener> ListenerDecorator<L> {
    /// Wrap a listener with no hooks installed.
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            before_accept: None,
            after_accept: None,
            before_close: None,
            after_close: None,
            after_addr: None,
        }
    }

    /// The wrapped listener.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Unwrap, dropping all hooks.
    pub fn into_inner(self) -> L {
        self.inner
    }

    /// Accept the next connection.
    ///
    /// The accepted connection starts with no hooks. The after-accept hook
    /// runs before this returns, on success and on failure alike.
    pub fn accept(&mut self) -> io::Result<ConnectionDecorator<L::Conn>> {
        if let Some(hook) = &self.before_accept {
            hook(self)?;
        }
        let mut result = self.inner.accept().map(ConnectionDecorator::new);
        if let Some(hook) = &self.after_accept {
            hook(self, result.as_mut().map_err(|err| &*err));
        }
        result
    }

    pub fn close(&mut self) -> io::Result<()> {
        if let Some(hook) = &self.before_close {
            hook(self)?;
        }
        let result = self.inner.close();
        if let Some(hook) = &self.after_close {
            hook(self, &result);
        }
        result
    }

    /// Address of the wrapped listener. There is no before hook: the query
    /// cannot fail, so there is nothing to veto.
    pub fn addr(&self) -> Option<Addr> {
        let addr = self.inner.addr();
        if let Some(hook) = &self.after_addr {
            hook(self, addr.as_ref());
        }
        addr
    }

    pub fn set_before_accept<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self) -> io::Result<()> + Send + Sync + 'static,
    {
        self.before_accept = Some(Arc::new(hook));
        self
    }

    pub fn set_after_accept<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self, Result<&mut ConnectionDecorator<L::Conn>, &io::Error>) + Send + Sync + 'static,
    {
        self.after_accept = Some(Arc::new(hook));
        self
    }

    pub fn set_before_close<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self) -> io::Result<()> + Send + Sync + 'static,
    {
        self.before_close = Some(Arc::new(hook));
        self
    }

    pub fn set_after_close<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self, &io::Result<()>) + Send + Sync + 'static,
    {
        self.after_close = Some(Arc::new(hook));
        self
    }

    pub fn set_after_addr<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self, Option<&Addr>) + Send + Sync + 'static,
    {
        self.after_addr = Some(Arc::new(hook));
        self
    }
}

impl<L: Listener> Listener for ListenerDecorator<L> {
    type Conn = ConnectionDecorator<L::Conn>;

    fn accept(&mut self) -> io::Result<Self::Conn> {
        ListenerDecorator::accept(self)
    }

    fn close(&mut self) -> io::Result<()> {
        ListenerDecorator::close(self)
    }

    fn addr(&self) -> Option<Addr> {
        ListenerDecorator::addr(self)
    }
}

impl<L: Listener + fmt::Debug> fmt::Debug for ListenerDecorator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerDecorator")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
