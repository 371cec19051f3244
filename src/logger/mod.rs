//! Logger module
//!
//! Provides logging utilities for the file server including:
//! - Subscriber setup (stdout or an append-only log file)
//! - Server lifecycle logging mirrored to the control-surface event sink
//! - Access logging with multiple formats
//! - Error and warning logging

mod events;
mod format;

pub use events::EventSink;
pub use format::AccessLogEntry;

use crate::config::LoggingConfig;
use std::fs::{File, OpenOptions};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber with configuration
///
/// Should be called once at application startup. `RUST_LOG` takes
/// precedence over the configured level.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.file.as_deref() {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(open_log_file(path)?))
            .try_init(),
        None => builder.try_init(),
    };

    result.map_err(|e| std::io::Error::new(std::io::ErrorKind::AlreadyExists, e.to_string()))
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> std::io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

pub fn log_server_start(events: &EventSink, addr: &SocketAddr, root: &Path) {
    tracing::info!(%addr, root = %root.display(), "file server started");
    events.emit(format!("server started on port {}", addr.port()));
    events.emit(format!("shared directory: {}", root.display()));
}

pub fn log_server_stop(events: &EventSink, clients: usize) {
    tracing::info!(clients, "file server stopped");
    events.emit("server stopped");
}

pub fn log_access_url(events: &EventSink, url: Option<&str>) {
    match url {
        Some(url) => {
            tracing::info!("Access address: {url}");
            events.emit(format!("access address: {url}"));
        }
        None => {
            tracing::warn!("unable to determine LAN address");
            events.emit("unable to determine LAN address");
        }
    }
}

/// A client asked for a file
pub fn log_client_request(events: &EventSink, client: &SocketAddr, path: &str) {
    let line = format!("{} -> {path}", client.ip());
    tracing::info!(target: "lan_share::clients", "{line}");
    events.emit(line);
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "lan_share::access", "{}", entry.format(format));
}

/// Connection-level failure, client aborts included
pub fn log_connection_error(peer: &SocketAddr, err: &impl std::fmt::Display) {
    tracing::debug!(%peer, "connection closed with error: {err}");
}

pub fn log_stream_error(path: &Path, err: &std::io::Error) {
    tracing::error!(path = %path.display(), "stream aborted: {err}");
}

pub fn log_forced_close(events: &EventSink, remaining: usize) {
    tracing::warn!(remaining, "grace period elapsed, closing remaining connections");
    events.emit(format!("forcing {remaining} connection(s) closed"));
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_request_line() {
        let (events, mut rx) = EventSink::channel(8);
        let peer: SocketAddr = "192.168.1.20:53211".parse().unwrap();
        log_client_request(&events, &peer, "/video.mp4");
        assert_eq!(rx.recv().await.unwrap(), "192.168.1.20 -> /video.mp4");
    }

    #[tokio::test]
    async fn test_lifecycle_lines() {
        let (events, mut rx) = EventSink::channel(8);
        let addr: SocketAddr = "0.0.0.0:5555".parse().unwrap();
        log_server_start(&events, &addr, Path::new("/srv/share"));
        log_server_stop(&events, 0);
        assert_eq!(rx.recv().await.unwrap(), "server started on port 5555");
        assert_eq!(rx.recv().await.unwrap(), "shared directory: /srv/share");
        assert_eq!(rx.recv().await.unwrap(), "server stopped");
    }

    #[test]
    fn test_open_log_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/nested/share.log");
        open_log_file(path.to_str().unwrap()).unwrap();
        assert!(path.exists());
    }
}
