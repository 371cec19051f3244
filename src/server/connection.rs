// Connection handling module
// Serves one TCP connection with hyper and honors server shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection and serve it on a task tracked by `connections`.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer` - The peer's socket address
/// * `state` - Shared application state
/// * `shutdown` - Cancelled when the server stops
/// * `keep_alive` - Whether HTTP/1.1 keep-alive is enabled
/// * `connections` - Set owning every live connection task
pub fn accept_connection(
    stream: TcpStream,
    peer: SocketAddr,
    state: &Arc<AppState>,
    shutdown: &CancellationToken,
    keep_alive: bool,
    connections: &mut JoinSet<()>,
) {
    tracing::debug!(%peer, "connection accepted");
    connections.spawn(serve_connection(
        stream,
        peer,
        Arc::clone(state),
        shutdown.clone(),
        keep_alive,
    ));
}

/// Serve a single connection until it closes.
///
/// When `shutdown` fires, the connection finishes the response in flight
/// (streamed bodies included) and then closes instead of waiting for the
/// next keep-alive request.
async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    state: Arc<AppState>,
    shutdown: CancellationToken,
    keep_alive: bool,
) {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req| handler::handle_request(req, peer, Arc::clone(&state)));

    let mut builder = http1::Builder::new();
    builder.keep_alive(keep_alive);
    let conn = builder.serve_connection(io, service);
    tokio::pin!(conn);

    let result = tokio::select! {
        result = conn.as_mut() => result,
        () = shutdown.cancelled() => {
            conn.as_mut().graceful_shutdown();
            conn.as_mut().await
        }
    };

    if let Err(err) = result {
        logger::log_connection_error(&peer, &err);
    }
}
