//! Capability traits for listeners and connections.
//!
//! # Responsibilities
//! - Describe what a listener can do (accept, close, report its address)
//! - Describe what a stream connection can do (read, write, close,
//!   report addresses, set deadlines)
//! - Expose packet (datagram) capability as an explicit, optional query
//!
//! # Design Decisions
//! - Operations mirror blocking std sockets and speak `std::io::Error`
//! - Address queries have no error path; `None` means "unknown"
//! - Deadlines are absolute instants, `None` clears them

use std::io;
use std::time::Instant;

use super::addr::Addr;

/// A bidirectional byte-stream connection.
pub trait Connection {
    /// Read bytes into `buf`, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write bytes from `buf`, returning how many were written.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Close the connection.
    fn close(&mut self) -> io::Result<()>;

    /// Local endpoint address, if known.
    fn local_addr(&self) -> Option<Addr>;

    /// Remote endpoint address, if known.
    fn remote_addr(&self) -> Option<Addr>;

    /// Set both the read and the write deadline.
    fn set_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()>;

    /// Set the deadline for future reads.
    fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()>;

    /// Set the deadline for future writes.
    fn set_write_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()>;

    /// Packet capability of this connection.
    ///
    /// Stream-only connections keep the default, which reports none. The
    /// answer must not change over the life of the connection.
    fn as_packet(&mut self) -> Option<&mut dyn PacketConnection> {
        None
    }
}

/// Datagram operations addressed per call.
pub trait PacketConnection {
    /// Receive one packet into `buf`, returning its length and sender.
    fn read_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, Addr)>;

    /// Send `buf` as one packet to `addr`.
    fn write_to(&mut self, buf: &[u8], addr: &Addr) -> io::Result<usize>;
}

/// A source of accepted connections.
pub trait Listener {
    /// Connection type produced by [`Listener::accept`].
    type Conn: Connection;

    /// Block until the next connection arrives.
    fn accept(&mut self) -> io::Result<Self::Conn>;

    /// Stop listening.
    fn close(&mut self) -> io::Result<()>;

    /// Address the listener is bound to, if known.
    fn addr(&self) -> Option<Addr>;
}
