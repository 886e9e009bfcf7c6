//! Accept loop and per-connection handling.
//!
//! # Responsibilities
//! - Accept connections from a decorated listener on the calling thread
//! - Serve each connection on the Tokio blocking pool
//! - Apply a read deadline before reading the request head
//! - Stop accepting and close the listener once shutdown is signalled

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;

use crate::config::ServerConfig;
use crate::http::request::read_request_head;
use crate::http::response::write_ok;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::net::{Connection, ConnectionDecorator, Listener, ListenerDecorator};

/// Pause after a failed accept before trying again.
const ACCEPT_ERROR_PAUSE: Duration = Duration::from_millis(50);

/// Serves a fixed greeting to every HTTP request.
#[derive(Debug, Clone)]
pub struct HelloServer {
    body: Arc<str>,
    read_timeout: Duration,
    runtime: Handle,
}

impl HelloServer {
    pub fn new(config: &ServerConfig, runtime: Handle) -> Self {
        Self {
            body: Arc::from(format!("{}\n", config.greeting)),
            read_timeout: Duration::from_secs(config.read_timeout_secs),
            runtime,
        }
    }

    /// Run the accept loop until `shutdown` fires or the listener fails.
    ///
    /// Blocks the calling thread. A connection accepted after shutdown was
    /// signalled (typically the wake-up connection) is closed unserved.
    pub fn serve<L>(&self, mut listener: ListenerDecorator<L>, shutdown: ShutdownSignal) -> io::Result<()>
    where
        L: Listener,
        L::Conn: Send + 'static,
    {
        loop {
            let accepted = listener.accept();

            if shutdown.is_triggered() {
                if let Ok(mut conn) = accepted {
                    let _ = conn.close();
                }
                break;
            }

            match accepted {
                Ok(conn) => {
                    let body = Arc::clone(&self.body);
                    let read_timeout = self.read_timeout;
                    self.runtime
                        .spawn_blocking(move || handle_connection(conn, &body, read_timeout));
                }
                Err(e) if e.kind() == io::ErrorKind::NotConnected => {
                    tracing::error!(error = %e, "Listener closed underneath accept loop");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed, retrying");
                    std::thread::sleep(ACCEPT_ERROR_PAUSE);
                }
            }
        }

        tracing::info!("Accept loop stopped");
        listener.close()
    }
}

/// Serve one request and close the connection.
pub fn handle_connection<C: Connection>(mut conn: ConnectionDecorator<C>, body: &str, read_timeout: Duration) {
    if let Err(e) = conn.set_read_deadline(Some(Instant::now() + read_timeout)) {
        tracing::warn!(error = %e, "Failed to set read deadline");
    }

    let served = read_request_head(&mut conn).and_then(|head| {
        tracing::debug!(
            method = %head.method,
            target = %head.target,
            version = %head.version,
            headers = head.header_count,
            "Request received"
        );
        write_ok(&mut conn, body)
    });

    if let Err(e) = served {
        tracing::debug!(error = %e, "Request not served");
    }
    if let Err(e) = conn.close() {
        tracing::debug!(error = %e, "Close failed");
    }
}
