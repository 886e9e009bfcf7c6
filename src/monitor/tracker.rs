//! Connection statistics tracker.
//!
//! # Responsibilities
//! - Install an after-accept hook on a [`ListenerDecorator`]
//! - Pick which connections to monitor (sampling)
//! - Install read/write/close hooks on each monitored connection
//! - Log a per-connection summary on close and export byte counters
//!
//! # Design Decisions
//! - Hooks are installed per connection from the accept hook, so unmonitored
//!   connections pay nothing beyond the decorator itself
//! - Records live in a shared concurrent map, keyed by [`ConnectionId`]

use std::io;
use std::sync::Arc;

use dashmap::DashMap;

use crate::monitor::stats::{ConnectionId, ConnectionStats, StatsSnapshot};
use crate::net::{Addr, Connection, ConnectionDecorator, Listener, ListenerDecorator};
use crate::observability::metrics;

fn describe(addr: Option<Addr>) -> String {
    addr.map_or_else(|| "<unknown>".to_string(), |a| a.to_string())
}

/// Tracks traffic of connections accepted through a decorated listener.
///
/// Cloning is cheap; clones share the same records.
#[derive(Debug, Clone)]
pub struct StatsTracker {
    connections: Arc<DashMap<ConnectionId, Arc<ConnectionStats>>>,
    sample_rate: f64,
}

impl StatsTracker {
    /// Create a tracker monitoring the given fraction of connections.
    ///
    /// The rate is clamped to `[0.0, 1.0]`.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
            sample_rate: sample_rate.clamp(0.0, 1.0),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Hook this tracker into a listener, replacing any after-accept hook.
    pub fn instrument<L>(&self, listener: &mut ListenerDecorator<L>)
    where
        L: Listener + 'static,
        L::Conn: 'static,
    {
        let tracker = self.clone();
        listener.set_after_accept(move |_listener, accepted| match accepted {
            Ok(conn) => {
                tracker.track(conn);
            }
            Err(e) => {
                tracing::error!(error = %e, "Error establishing connection");
            }
        });
    }

    /// Start monitoring one connection, subject to sampling.
    ///
    /// Returns the assigned ID, or `None` if the connection was not sampled.
    pub fn track<C>(&self, conn: &mut ConnectionDecorator<C>) -> Option<ConnectionId>
    where
        C: Connection + 'static,
    {
        if !self.should_sample() {
            tracing::trace!("Connection not sampled");
            return None;
        }

        let id = ConnectionId::new();
        let stats = Arc::new(ConnectionStats::new());
        self.connections.insert(id, Arc::clone(&stats));
        metrics::record_connection_opened();

        tracing::info!(
            connection_id = %id,
            local_addr = %describe(conn.local_addr()),
            remote_addr = %describe(conn.remote_addr()),
            "Connection started"
        );

        let read_stats = Arc::clone(&stats);
        conn.set_after_read(move |_, _, result| match result {
            Ok(n) => {
                read_stats.record_read(*n);
                metrics::record_bytes_read(*n);
            }
            Err(e) => {
                tracing::warn!(connection_id = %id, error = %e, "Error reading from connection");
                metrics::record_io_error("read");
            }
        });

        let write_stats = stats;
        conn.set_after_write(move |_, _, result| match result {
            Ok(n) => {
                write_stats.record_written(*n);
                metrics::record_bytes_written(*n);
            }
            Err(e) => {
                tracing::warn!(connection_id = %id, error = %e, "Error writing to connection");
                metrics::record_io_error("write");
            }
        });

        let tracker = self.clone();
        conn.set_after_close(move |inner, result| tracker.finish(id, inner, result));

        Some(id)
    }

    fn finish<C: Connection>(&self, id: ConnectionId, conn: &C, result: &io::Result<()>) {
        if let Err(e) = result {
            tracing::warn!(connection_id = %id, error = %e, "Error closing connection");
            metrics::record_io_error("close");
        }

        let Some((_, stats)) = self.connections.remove(&id) else {
            tracing::warn!(connection_id = %id, "Connection not tracked");
            return;
        };
        metrics::record_connection_closed();

        let snap = stats.snapshot();
        tracing::info!(
            connection_id = %id,
            local_addr = %describe(conn.local_addr()),
            remote_addr = %describe(conn.remote_addr()),
            bytes_read = snap.bytes_read,
            bytes_written = snap.bytes_written,
            duration_ms = snap.elapsed.as_millis() as u64,
            "Connection closed"
        );
    }

    fn should_sample(&self) -> bool {
        self.sample_rate >= 1.0 || fastrand::f64() < self.sample_rate
    }

    /// Number of monitored connections not yet closed.
    pub fn active_count(&self) -> usize {
        self.connections.len()
    }

    pub fn get(&self, id: ConnectionId) -> Option<StatsSnapshot> {
        self.connections.get(&id).map(|entry| entry.snapshot())
    }

    /// Snapshot of every open monitored connection, ordered by ID.
    pub fn snapshot(&self) -> Vec<(ConnectionId, StatsSnapshot)> {
        let mut all: Vec<_> = self
            .connections
            .iter()
            .map(|entry| (*entry.key(), entry.value().snapshot()))
            .collect();
        all.sort_by_key(|(id, _)| *id);
        all
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_is_clamped() {
        assert_eq!(StatsTracker::new(3.0).sample_rate(), 1.0);
        assert_eq!(StatsTracker::new(-1.0).sample_rate(), 0.0);
    }

    #[test]
    fn zero_rate_never_samples() {
        let tracker = StatsTracker::new(0.0);
        assert!((0..100).all(|_| !tracker.should_sample()));
    }

    #[test]
    fn full_rate_always_samples() {
        let tracker = StatsTracker::default();
        assert!((0..100).all(|_| tracker.should_sample()));
    }

    #[test]
    fn describe_unknown_address() {
        assert_eq!(describe(None), "<unknown>");
    }
}
