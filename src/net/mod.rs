//! Network introspection layer.
//!
//! # Data Flow
//! ```text
//! Real listener (TcpAcceptor, ...)
//!     → ListenerDecorator::accept (before/after accept hooks)
//!     → ConnectionDecorator (fresh, no hooks)
//!     → after-accept hook installs per-connection hooks
//!     → serving loop reads/writes through the connection hooks
//! ```
//!
//! # Design Decisions
//! - Decorators implement the same traits they wrap, so they substitute
//!   for the undecorated objects
//! - Packet capability is queried explicitly per call
//! - The decorators own no locks, threads or global state

pub mod addr;
pub mod connection;
mod deadline;
pub mod error;
pub mod hooks;
pub mod listener;
pub mod tcp;
pub mod transport;
pub mod udp;

pub use addr::Addr;
pub use connection::ConnectionDecorator;
pub use error::{is_not_packet_connection, NotPacketConnection};
pub use listener::ListenerDecorator;
pub use tcp::{TcpAcceptor, TcpConnection};
pub use transport::{Connection, Listener, PacketConnection};
pub use udp::UdpConnection;
