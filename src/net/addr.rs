//! Transport-agnostic endpoint addresses.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Address of a listener or connection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Addr {
    /// IP socket address (TCP, UDP).
    Inet(SocketAddr),
    /// Filesystem path of a Unix domain socket.
    Unix(PathBuf),
}

impl Addr {
    /// Get the socket address if this is an IP endpoint.
    pub fn as_inet(&self) -> Option<SocketAddr> {
        match self {
            Addr::Inet(addr) => Some(*addr),
            Addr::Unix(_) => None,
        }
    }
}

impl From<SocketAddr> for Addr {
    fn from(addr: SocketAddr) -> Self {
        Addr::Inet(addr)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Addr::Inet(addr) => write!(f, "{}", addr),
            Addr::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}
