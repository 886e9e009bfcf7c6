//! TCP adapters over the standard library sockets.
//!
//! # Responsibilities
//! - Bind and accept TCP connections ([`TcpAcceptor`])
//! - Expose accepted streams as stream-only [`Connection`]s ([`TcpConnection`])
//! - Emulate absolute deadlines with per-operation socket timeouts

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Instant;

use super::addr::Addr;
use super::deadline::{map_timeout, Deadline};
use super::transport::{Connection, Listener};

fn listener_closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "listener is closed")
}

fn connection_closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "use of closed connection")
}

/// A TCP listener whose `close` releases the socket.
#[derive(Debug)]
pub struct TcpAcceptor {
    inner: Option<TcpListener>,
}

impl TcpAcceptor {
    /// Bind to the given address.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        if let Ok(local_addr) = listener.local_addr() {
            tracing::info!(address = %local_addr, "Listener bound");
        }
        Ok(Self::from_std(listener))
    }

    /// Adopt an already bound listener.
    pub fn from_std(listener: TcpListener) -> Self {
        Self {
            inner: Some(listener),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl Listener for TcpAcceptor {
    type Conn = TcpConnection;

    fn accept(&mut self) -> io::Result<TcpConnection> {
        let listener = self.inner.as_ref().ok_or_else(listener_closed)?;
        let (stream, peer_addr) = listener.accept()?;
        tracing::debug!(peer_addr = %peer_addr, "Connection accepted");
        Ok(TcpConnection::new(stream))
    }

    fn close(&mut self) -> io::Result<()> {
        let listener = self.inner.take().ok_or_else(listener_closed)?;
        tracing::debug!(address = ?listener.local_addr().ok(), "Listener closed");
        Ok(())
    }

    fn addr(&self) -> Option<Addr> {
        let listener = self.inner.as_ref()?;
        listener.local_addr().ok().map(Addr::Inet)
    }
}

/// A TCP stream with deadline support. Has no packet capability.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    read_deadline: Deadline,
    write_deadline: Deadline,
    closed: bool,
}

impl TcpConnection {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            read_deadline: Deadline::default(),
            write_deadline: Deadline::default(),
            closed: false,
        }
    }

    /// Connect to a remote address.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        TcpStream::connect(addr).map(Self::new)
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            Err(connection_closed())
        } else {
            Ok(())
        }
    }
}

impl Connection for TcpConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ensure_open()?;
        if self.read_deadline.is_set() {
            let timeout = self.read_deadline.remaining()?;
            self.stream.set_read_timeout(timeout)?;
        }
        self.stream
            .read(buf)
            .map_err(|err| map_timeout(err, &self.read_deadline))
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.ensure_open()?;
        if self.write_deadline.is_set() {
            let timeout = self.write_deadline.remaining()?;
            self.stream.set_write_timeout(timeout)?;
        }
        self.stream
            .write(buf)
            .map_err(|err| map_timeout(err, &self.write_deadline))
    }

    fn close(&mut self) -> io::Result<()> {
        self.ensure_open()?;
        self.closed = true;
        match self.stream.shutdown(Shutdown::Both) {
            // The peer may already have torn the connection down.
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }

    fn local_addr(&self) -> Option<Addr> {
        self.stream.local_addr().ok().map(Addr::Inet)
    }

    fn remote_addr(&self) -> Option<Addr> {
        self.stream.peer_addr().ok().map(Addr::Inet)
    }

    fn set_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        self.set_read_deadline(deadline)?;
        self.set_write_deadline(deadline)
    }

    fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        self.ensure_open()?;
        self.read_deadline.set(deadline);
        if deadline.is_none() {
            self.stream.set_read_timeout(None)?;
        }
        Ok(())
    }

    fn set_write_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        self.ensure_open()?;
        self.write_deadline.set(deadline);
        if deadline.is_none() {
            self.stream.set_write_timeout(None)?;
        }
        Ok(())
    }
}
