// Server loop module
// Accepts connections until shutdown, then drains them within the grace period

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger::{self, EventSink};

/// Pause after a failed accept (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Configuration for server loop behavior
#[derive(Debug, Clone, Copy)]
pub struct ServerLoopConfig {
    pub keep_alive: bool,
    /// How long in-flight connections may run after shutdown
    pub shutdown_grace: Duration,
}

/// Accept loop of one server run
///
/// Returns once the listener is closed and every connection has finished
/// or been aborted.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: CancellationToken,
    config: ServerLoopConfig,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            () = shutdown.cancelled() => break,

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer)) => {
                        accept_connection(
                            stream,
                            peer,
                            &state,
                            &shutdown,
                            config.keep_alive,
                            &mut connections,
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }

            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    logger::log_error(&format!("Connection task failed: {e}"));
                }
            }
        }
    }

    // Stop accepting before draining
    drop(listener);
    drain_connections(&mut connections, config.shutdown_grace, &state.events).await;
}

/// Wait up to `grace` for live connections, then abort the rest.
///
/// Aborting a connection task drops its body stream, which closes any file
/// the stream still holds.
async fn drain_connections(connections: &mut JoinSet<()>, grace: Duration, events: &EventSink) {
    if connections.is_empty() {
        return;
    }

    tracing::info!(
        active = connections.len(),
        grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
        "waiting for in-flight connections"
    );

    let drained = tokio::time::timeout(grace, async {
        while connections.join_next().await.is_some() {}
    })
    .await;

    if drained.is_err() {
        logger::log_forced_close(events, connections.len());
        connections.shutdown().await;
    }
}
