//! Minimal HTTP/1.1 responder served through the decorators.
//!
//! # Data Flow
//! ```text
//! ListenerDecorator::accept (stats hooks installed)
//!     → server.rs (accept loop, hands connection to blocking pool)
//!     → request.rs (read request head under a read deadline)
//!     → response.rs (fixed greeting, Connection: close)
//!     → ConnectionDecorator::close (stats summary logged)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use server::HelloServer;
