//! Errors introduced by the decorator layer.
//!
//! Everything else the decorators return is the wrapped object's own
//! `io::Error` or whatever a before hook chose to return.

use std::io;
use thiserror::Error;

/// The wrapped connection has no packet (datagram) capability.
///
/// Reported by `read_from`/`write_to` as an `io::Error` of kind
/// [`io::ErrorKind::Unsupported`] carrying this value as its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("connection is not a packet connection")]
pub struct NotPacketConnection;

impl From<NotPacketConnection> for io::Error {
    fn from(err: NotPacketConnection) -> Self {
        io::Error::new(io::ErrorKind::Unsupported, err)
    }
}

/// Check whether an error is the capability-absence error.
pub fn is_not_packet_connection(err: &io::Error) -> bool {
    err.get_ref()
        .is_some_and(|inner| inner.is::<NotPacketConnection>())
}
