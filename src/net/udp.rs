//! UDP adapter over the standard library socket.
//!
//! [`UdpConnection`] is the packet-capable transport: `read_from`/`write_to`
//! address each datagram, while `read`/`write` talk to the connected peer.

use std::io;
use std::net::{ToSocketAddrs, UdpSocket};
use std::time::Instant;

use super::addr::Addr;
use super::deadline::{map_timeout, Deadline};
use super::transport::{Connection, PacketConnection};

fn connection_closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "use of closed connection")
}

#[derive(Debug)]
pub struct UdpConnection {
    socket: UdpSocket,
    read_deadline: Deadline,
    write_deadline: Deadline,
    closed: bool,
}

impl UdpConnection {
    /// Bind a socket to a local address.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        UdpSocket::bind(addr).map(Self::from_std)
    }

    pub fn from_std(socket: UdpSocket) -> Self {
        Self {
            socket,
            read_deadline: Deadline::default(),
            write_deadline: Deadline::default(),
            closed: false,
        }
    }

    /// Fix the peer used by `read`/`write`.
    pub fn connect<A: ToSocketAddrs>(&self, addr: A) -> io::Result<()> {
        self.socket.connect(addr)
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            Err(connection_closed())
        } else {
            Ok(())
        }
    }

    fn arm_read(&self) -> io::Result<()> {
        self.ensure_open()?;
        if self.read_deadline.is_set() {
            self.socket.set_read_timeout(self.read_deadline.remaining()?)?;
        }
        Ok(())
    }

    fn arm_write(&self) -> io::Result<()> {
        self.ensure_open()?;
        if self.write_deadline.is_set() {
            self.socket.set_write_timeout(self.write_deadline.remaining()?)?;
        }
        Ok(())
    }
}

impl Connection for UdpConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.arm_read()?;
        self.socket
            .recv(buf)
            .map_err(|err| map_timeout(err, &self.read_deadline))
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.arm_write()?;
        self.socket
            .send(buf)
            .map_err(|err| map_timeout(err, &self.write_deadline))
    }

    fn close(&mut self) -> io::Result<()> {
        self.ensure_open()?;
        self.closed = true;
        tracing::trace!(local_addr = ?self.socket.local_addr().ok(), "UDP socket closed");
        Ok(())
    }

    fn local_addr(&self) -> Option<Addr> {
        self.socket.local_addr().ok().map(Addr::Inet)
    }

    fn remote_addr(&self) -> Option<Addr> {
        self.socket.peer_addr().ok().map(Addr::Inet)
    }

    fn set_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        self.set_read_deadline(deadline)?;
        self.set_write_deadline(deadline)
    }

    fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        self.ensure_open()?;
        self.read_deadline.set(deadline);
        if deadline.is_none() {
            self.socket.set_read_timeout(None)?;
        }
        Ok(())
    }

    fn set_write_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        self.ensure_open()?;
        self.write_deadline.set(deadline);
        if deadline.is_none() {
            self.socket.set_write_timeout(None)?;
        }
        Ok(())
    }

    fn as_packet(&mut self) -> Option<&mut dyn PacketConnection> {
        Some(self as &mut dyn PacketConnection)
    }
}

impl PacketConnection for UdpConnection {
    fn read_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, Addr)> {
        self.arm_read()?;
        let (n, from) = self
            .socket
            .recv_from(buf)
            .map_err(|err| map_timeout(err, &self.read_deadline))?;
        Ok((n, Addr::Inet(from)))
    }

    fn write_to(&mut self, buf: &[u8], addr: &Addr) -> io::Result<usize> {
        let target = addr.as_inet().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot send UDP datagram to {}", addr),
            )
        })?;
        self.arm_write()?;
        self.socket
            .send_to(buf, target)
            .map_err(|err| map_timeout(err, &self.write_deadline))
    }
}
