//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Adapters, monitor, server:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges via the metrics facade)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - The decorator core never logs; observation is done by hooks
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
