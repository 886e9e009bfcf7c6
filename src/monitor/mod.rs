//! Per-connection statistics built on the decorator hooks.
//!
//! # Data Flow
//! ```text
//! ListenerDecorator after-accept hook (installed by StatsTracker)
//!     → sampling decision
//!     → ConnectionStats registered under a ConnectionId
//!     → after-read / after-write hooks add byte counts
//!     → after-close hook logs the summary and drops the record
//! ```

pub mod stats;
pub mod tracker;

pub use stats::{ConnectionId, ConnectionStats, StatsSnapshot};
pub use tracker::StatsTracker;
