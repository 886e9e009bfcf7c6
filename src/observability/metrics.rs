//! Metrics collection and exposition.
//!
//! # Metrics
//! - `connxray_bytes_read_total` (counter): bytes read on monitored connections
//! - `connxray_bytes_written_total` (counter): bytes written on monitored connections
//! - `connxray_connections_total` (counter): monitored connections accepted
//! - `connxray_connections_active` (gauge): monitored connections still open
//! - `connxray_io_errors_total` (counter): failed operations by `op`

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const BYTES_READ: &str = "connxray_bytes_read_total";
pub const BYTES_WRITTEN: &str = "connxray_bytes_written_total";
pub const CONNECTIONS_TOTAL: &str = "connxray_connections_total";
pub const CONNECTIONS_ACTIVE: &str = "connxray_connections_active";
pub const IO_ERRORS: &str = "connxray_io_errors_total";

/// Install the Prometheus recorder with an HTTP scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    ::metrics::describe_counter!(BYTES_READ, "Bytes read on monitored connections");
    ::metrics::describe_counter!(BYTES_WRITTEN, "Bytes written on monitored connections");
    ::metrics::describe_counter!(CONNECTIONS_TOTAL, "Monitored connections accepted");
    ::metrics::describe_gauge!(CONNECTIONS_ACTIVE, "Monitored connections currently open");
    ::metrics::describe_counter!(IO_ERRORS, "Failed operations on monitored connections");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_bytes_read(n: usize) {
    ::metrics::counter!(BYTES_READ).increment(n as u64);
}

pub fn record_bytes_written(n: usize) {
    ::metrics::counter!(BYTES_WRITTEN).increment(n as u64);
}

pub fn record_connection_opened() {
    ::metrics::counter!(CONNECTIONS_TOTAL).increment(1);
    ::metrics::gauge!(CONNECTIONS_ACTIVE).increment(1.0);
}

pub fn record_connection_closed() {
    ::metrics::gauge!(CONNECTIONS_ACTIVE).decrement(1.0);
}

pub fn record_io_error(op: &'static str) {
    ::metrics::counter!(IO_ERRORS, "op" => op).increment(1);
}
