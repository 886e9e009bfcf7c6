//! Connection decorator.
//!
//! # Responsibilities
//! - Forward every connection operation to the wrapped connection
//! - Run the optional before hook, which may veto the call
//! - Run the optional after hook with the true inputs and outcome
//! - Report missing packet capability for `read_from`/`write_to`
//!
//! # Design Decisions
//! - Hooks are plain optional fields; `None` is a no-op
//! - Hooks run inline, after the wrapped call returns and before the
//!   decorated call returns
//! - Errors are never retried, wrapped or logged here

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use super::addr::Addr;
use super::error::NotPacketConnection;
use super::hooks::{
    AfterAddr, AfterClose, AfterDeadline, AfterIo, AfterReadFrom, AfterWriteTo, BeforeClose,
    BeforeDeadline, BeforeIo, BeforeWriteTo,
};
use super::transport::{Connection, PacketConnection};

/// Wraps a [`Connection`] and runs hooks around each of its operations.
///
/// Instances are usually produced by
/// [`ListenerDecorator::accept`](super::listener::ListenerDecorator::accept),
/// whose after-accept hook is the natural place to install per-connection
/// hooks before the serving code starts using the connection.
pub struct ConnectionDecorator<C> {
    inner: C,

    pub before_read: Option<BeforeIo<C>>,
    pub after_read: Option<AfterIo<C>>,
    pub before_read_from: Option<BeforeIo<C>>,
    pub after_read_from: Option<AfterReadFrom<C>>,
    pub before_write: Option<BeforeIo<C>>,
    pub after_write: Option<AfterIo<C>>,
    pub before_write_to: Option<BeforeWriteTo<C>>,
    pub after_write_to: Option<AfterWriteTo<C>>,
    pub before_close: Option<BeforeClose<C>>,
    pub after_close: Option<AfterClose<C>>,
    pub after_local_addr: Option<AfterAddr<C>>,
    pub after_remote_addr: Option<AfterAddr<C>>,
    pub before_set_deadline: Option<BeforeDeadline<C>>,
    pub after_set_deadline: Option<AfterDeadline<C>>,
    pub before_set_read_deadline: Option<BeforeDeadline<C>>,
    pub after_set_read_deadline: Option<AfterDeadline<C>>,
    pub before_set_write_deadline: Option<BeforeDeadline<C>>,
    pub after_set_write_deadline: Option<AfterDeadline<C>>,
}

impl<C: Connection> ConnectionDecorator<C> {
    /// Wrap a connection with no hooks installed.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            before_read: None,
            after_read: None,
            before_read_from: None,
            after_read_from: None,
            before_write: None,
            after_write: None,
            before_write_to: None,
            after_write_to: None,
            before_close: None,
            after_close: None,
            after_local_addr: None,
            after_remote_addr: None,
            before_set_deadline: None,
            after_set_deadline: None,
            before_set_read_deadline: None,
            after_set_read_deadline: None,
            before_set_write_deadline: None,
            after_set_write_deadline: None,
        }
    }

    /// The wrapped connection.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Mutable access to the wrapped connection, bypassing all hooks.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Unwrap, dropping all hooks.
    pub fn into_inner(self) -> C {
        self.inner
    }

    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(hook) = &self.before_read {
            hook(&self.inner, buf)?;
        }
        let result = self.inner.read(buf);
        if let Some(hook) = &self.after_read {
            hook(&self.inner, buf, &result);
        }
        result
    }

    pub fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(hook) = &self.before_write {
            hook(&self.inner, buf)?;
        }
        let result = self.inner.write(buf);
        if let Some(hook) = &self.after_write {
            hook(&self.inner, buf, &result);
        }
        result
    }

    /// Receive one packet from the wrapped connection.
    ///
    /// When the wrapped connection is stream-only the result is
    /// [`NotPacketConnection`]; the before hook is skipped but the after
    /// hook still observes the failure.
    pub fn read_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, Addr)> {
        let capable = self.inner.as_packet().is_some();
        if capable {
            if let Some(hook) = &self.before_read_from {
                hook(&self.inner, buf)?;
            }
        }
        let result = match self.packet(capable) {
            Some(packet) => packet.read_from(buf),
            None => Err(NotPacketConnection.into()),
        };
        if let Some(hook) = &self.after_read_from {
            hook(&self.inner, buf, &result);
        }
        result
    }

    /// Send one packet through the wrapped connection.
    ///
    /// Capability is checked the same way as in [`Self::read_from`].
    pub fn write_to(&mut self, buf: &[u8], addr: &Addr) -> io::Result<usize> {
        let capable = self.inner.as_packet().is_some();
        if capable {
            if let Some(hook) = &self.before_write_to {
                hook(&self.inner, buf, addr)?;
            }
        }
        let result = match self.packet(capable) {
            Some(packet) => packet.write_to(buf, addr),
            None => Err(NotPacketConnection.into()),
        };
        if let Some(hook) = &self.after_write_to {
            hook(&self.inner, buf, addr, &result);
        }
        result
    }

    // The before hook needs `&C`, so the packet view is borrowed again for
    // dispatch. Capability is fixed per connection (see
    // `Connection::as_packet`), so a capable connection always yields a view.
    fn packet(&mut self, capable: bool) -> Option<&mut dyn PacketConnection> {
        if capable {
            self.inner.as_packet()
        } else {
            None
        }
    }

    /// Close the wrapped connection.
    ///
    /// The decorator keeps forwarding calls afterwards; what they return is
    /// up to the wrapped connection.
    pub fn close(&mut self) -> io::Result<()> {
        if let Some(hook) = &self.before_close {
            hook(&self.inner)?;
        }
        let result = self.inner.close();
        if let Some(hook) = &self.after_close {
            hook(&self.inner, &result);
        }
        result
    }

    pub fn local_addr(&self) -> Option<Addr> {
        let addr = self.inner.local_addr();
        if let Some(hook) = &self.after_local_addr {
            hook(&self.inner, addr.as_ref());
        }
        addr
    }

    pub fn remote_addr(&self) -> Option<Addr> {
        let addr = self.inner.remote_addr();
        if let Some(hook) = &self.after_remote_addr {
            hook(&self.inner, addr.as_ref());
        }
        addr
    }

    pub fn set_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        if let Some(hook) = &self.before_set_deadline {
            hook(&self.inner, deadline)?;
        }
        let result = self.inner.set_deadline(deadline);
        if let Some(hook) = &self.after_set_deadline {
            hook(&self.inner, deadline, &result);
        }
        result
    }

    pub fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        if let Some(hook) = &self.before_set_read_deadline {
            hook(&self.inner, deadline)?;
        }
        let result = self.inner.set_read_deadline(deadline);
        if let Some(hook) = &self.after_set_read_deadline {
            hook(&self.inner, deadline, &result);
        }
        result
    }

    pub fn set_write_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        if let Some(hook) = &self.before_set_write_deadline {
            hook(&self.inner, deadline)?;
        }
        let result = self.inner.set_write_deadline(deadline);
        if let Some(hook) = &self.after_set_write_deadline {
            hook(&self.inner, deadline, &result);
        }
        result
    }

    pub fn set_before_read<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, &[u8]) -> io::Result<()> + Send + Sync + 'static,
    {
        self.before_read = Some(Arc::new(hook));
        self
    }

    pub fn set_after_read<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, &[u8], &io::Result<usize>) + Send + Sync + 'static,
    {
        self.after_read = Some(Arc::new(hook));
        self
    }

    pub fn set_before_read_from<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, &[u8]) -> io::Result<()> + Send + Sync + 'static,
    {
        self.before_read_from = Some(Arc::new(hook));
        self
    }

    pub fn set_after_read_from<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, &[u8], &io::Result<(usize, Addr)>) + Send + Sync + 'static,
    {
        self.after_read_from = Some(Arc::new(hook));
        self
    }

    pub fn set_before_write<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, &[u8]) -> io::Result<()> + Send + Sync + 'static,
    {
        self.before_write = Some(Arc::new(hook));
        self
    }

    pub fn set_after_write<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, &[u8], &io::Result<usize>) + Send + Sync + 'static,
    {
        self.after_write = Some(Arc::new(hook));
        self
    }

    pub fn set_before_write_to<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, &[u8], &Addr) -> io::Result<()> + Send + Sync + 'static,
    {
        self.before_write_to = Some(Arc::new(hook));
        self
    }

    pub fn set_after_write_to<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, &[u8], &Addr, &io::Result<usize>) + Send + Sync + 'static,
    {
        self.after_write_to = Some(Arc::new(hook));
        self
    }

    pub fn set_before_close<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C) -> io::Result<()> + Send + Sync + 'static,
    {
        self.before_close = Some(Arc::new(hook));
        self
    }

    pub fn set_after_close<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, &io::Result<()>) + Send + Sync + 'static,
    {
        self.after_close = Some(Arc::new(hook));
        self
    }

    pub fn set_after_local_addr<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, Option<&Addr>) + Send + Sync + 'static,
    {
        self.after_local_addr = Some(Arc::new(hook));
        self
    }

    pub fn set_after_remote_addr<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, Option<&Addr>) + Send + Sync + 'static,
    {
        self.after_remote_addr = Some(Arc::new(hook));
        self
    }

    pub fn set_before_set_deadline<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, Option<Instant>) -> io::Result<()> + Send + Sync + 'static,
    {
        self.before_set_deadline = Some(Arc::new(hook));
        self
    }

    pub fn set_after_set_deadline<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, Option<Instant>, &io::Result<()>) + Send + Sync + 'static,
    {
        self.after_set_deadline = Some(Arc::new(hook));
        self
    }

    pub fn set_before_set_read_deadline<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, Option<Instant>) -> io::Result<()> + Send + Sync + 'static,
    {
        self.before_set_read_deadline = Some(Arc::new(hook));
        self
    }

    pub fn set_after_set_read_deadline<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, Option<Instant>, &io::Result<()>) + Send + Sync + 'static,
    {
        self.after_set_read_deadline = Some(Arc::new(hook));
        self
    }

    pub fn set_before_set_write_deadline<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, Option<Instant>) -> io::Result<()> + Send + Sync + 'static,
    {
        self.before_set_write_deadline = Some(Arc::new(hook));
        self
    }

    pub fn set_after_set_write_deadline<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&C, Option<Instant>, &io::Result<()>) + Send + Sync + 'static,
    {
        self.after_set_write_deadline = Some(Arc::new(hook));
        self
    }
}

impl<C: Connection> Connection for ConnectionDecorator<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        ConnectionDecorator::read(self, buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ConnectionDecorator::write(self, buf)
    }

    fn close(&mut self) -> io::Result<()> {
        ConnectionDecorator::close(self)
    }

    fn local_addr(&self) -> Option<Addr> {
        ConnectionDecorator::local_addr(self)
    }

    fn remote_addr(&self) -> Option<Addr> {
        ConnectionDecorator::remote_addr(self)
    }

    fn set_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        ConnectionDecorator::set_deadline(self, deadline)
    }

    fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        ConnectionDecorator::set_read_deadline(self, deadline)
    }

    fn set_write_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        ConnectionDecorator::set_write_deadline(self, deadline)
    }

    // Packet calls go through this decorator so their hooks still fire.
    fn as_packet(&mut self) -> Option<&mut dyn PacketConnection> {
        if self.inner.as_packet().is_some() {
            Some(self as &mut dyn PacketConnection)
        } else {
            None
        }
    }
}

impl<C: Connection> PacketConnection for ConnectionDecorator<C> {
    fn read_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, Addr)> {
        ConnectionDecorator::read_from(self, buf)
    }

    fn write_to(&mut self, buf: &[u8], addr: &Addr) -> io::Result<usize> {
        ConnectionDecorator::write_to(self, buf, addr)
    }
}

impl<C: Connection> io::Read for ConnectionDecorator<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        ConnectionDecorator::read(self, buf)
    }
}

impl<C: Connection> io::Write for ConnectionDecorator<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ConnectionDecorator::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<C: fmt::Debug> fmt::Debug for ConnectionDecorator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDecorator")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
