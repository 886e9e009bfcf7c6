//! Monitored HTTP server.
//!
//! Serves a fixed greeting over a decorated TCP listener and logs, for every
//! sampled connection, how many bytes were read and written and how long
//! it stayed open.
//!
//! ```text
//! TcpAcceptor
//!     → ListenerDecorator (StatsTracker after-accept hook)
//!     → acceptor thread: HelloServer::serve
//!     → blocking pool: one task per connection
//! ```

use std::error::Error;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use clap::Parser;

use connxray::config::{load_config, validate_config, ConfigError, MonitorConfig};
use connxray::http::HelloServer;
use connxray::lifecycle::{signals, Shutdown};
use connxray::net::{ListenerDecorator, TcpAcceptor};
use connxray::observability::{logging, metrics};
use connxray::StatsTracker;

/// How long shutdown waits for the accept loop to stop.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Parser)]
#[command(name = "connxray")]
#[command(about = "HTTP server with per-connection traffic statistics", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configured bind address port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level, overriding the configuration.
    #[arg(long)]
    log_level: Option<String>,

    /// Fraction of connections to monitor.
    #[arg(long)]
    sample_rate: Option<f64>,
}

fn apply_overrides(config: &mut MonitorConfig, cli: &Cli) {
    if let Some(port) = cli.port {
        config.listener.bind_address = match config.listener.bind_address.parse::<SocketAddr>() {
            Ok(mut addr) => {
                addr.set_port(port);
                addr.to_string()
            }
            Err(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port).to_string(),
        };
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    if let Some(rate) = cli.sample_rate {
        config.monitor.sample_rate = rate;
    }
}

/// Wait for `handle` to finish, or give up after `grace`.
///
/// Polls instead of joining on the blocking pool, which the runtime would
/// wait for on exit.
async fn join_within<T>(handle: JoinHandle<T>, grace: Duration) -> Option<thread::Result<T>> {
    let deadline = tokio::time::Instant::now() + grace;
    while !handle.is_finished() {
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(JOIN_POLL_INTERVAL).await;
    }
    Some(handle.join())
}

/// Address that reaches a listener bound to `addr`, for the wake-up dial.
fn wake_address(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(Ipv4Addr::LOCALHOST.into(), addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(Ipv6Addr::LOCALHOST.into(), addr.port()),
        _ => addr,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };
    apply_overrides(&mut config, &cli);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level.to_ascii_lowercase());
    tracing::info!("connxray v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        sample_rate = config.monitor.sample_rate,
        read_timeout_secs = config.server.read_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics endpoint");
        }
    }

    let mut listener = ListenerDecorator::new(TcpAcceptor::bind(&config.listener.bind_address)?);
    let tracker = StatsTracker::new(config.monitor.sample_rate);
    tracker.instrument(&mut listener);

    let local_addr = listener.addr().and_then(|addr| addr.as_inet());
    tracing::info!(address = ?local_addr, "About to start serving");

    let shutdown = Shutdown::new();
    let server = HelloServer::new(&config.server, tokio::runtime::Handle::current());
    let signal = shutdown.subscribe();
    let acceptor = thread::Builder::new()
        .name("acceptor".into())
        .spawn(move || server.serve(listener, signal))?;

    signals::wait_for_signal().await;
    shutdown.trigger();

    // Unblock the acceptor thread, which is parked in accept().
    if let Some(addr) = local_addr {
        if let Err(e) = TcpStream::connect_timeout(&wake_address(addr), Duration::from_secs(1)) {
            tracing::warn!(error = %e, "Failed to wake accept loop");
        }
    }

    match join_within(acceptor, SHUTDOWN_GRACE).await {
        Some(Ok(Ok(()))) => {}
        Some(Ok(Err(e))) => tracing::error!(error = %e, "Accept loop failed"),
        Some(Err(_)) => tracing::error!("Accept loop panicked"),
        None => tracing::error!(
            grace_secs = SHUTDOWN_GRACE.as_secs(),
            "Accept loop did not stop in time, exiting anyway"
        ),
    }

    tracing::info!(
        open_connections = tracker.active_count(),
        "Shutdown complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wake_address_maps_unspecified_to_loopback() {
        let addr: SocketAddr = "0.0.0.0:1983".parse().unwrap();
        assert_eq!(wake_address(addr), "127.0.0.1:1983".parse::<SocketAddr>().unwrap());

        let addr: SocketAddr = "[::]:1983".parse().unwrap();
        assert_eq!(wake_address(addr), "[::1]:1983".parse::<SocketAddr>().unwrap());

        let addr: SocketAddr = "10.0.0.1:80".parse().unwrap();
        assert_eq!(wake_address(addr), addr);
    }

    #[test]
    fn port_override_keeps_host() {
        let cli = Cli::parse_from(["connxray", "--port", "8080", "--sample-rate", "0.5"]);
        let mut config = MonitorConfig::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.monitor.sample_rate, 0.5);
    }

    #[tokio::test]
    async fn join_within_gives_up_on_a_stuck_thread() {
        let (release, wait) = std::sync::mpsc::channel::<()>();
        let stuck = thread::spawn(move || wait.recv().is_ok());
        assert!(join_within(stuck, Duration::from_millis(50)).await.is_none());
        release.send(()).unwrap();

        let done = thread::spawn(|| 7);
        let joined = join_within(done, Duration::from_secs(5)).await;
        assert_eq!(joined.map(|r| r.unwrap()), Some(7));
    }
}
