// Server module entry point
// Owns the start/stop lifecycle of the file server

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword and cannot be a module name
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used items
pub use listener::{access_url, create_listener, detect_lan_ip};
pub use server_loop::{start_server_loop, ServerLoopConfig};
pub use signal::wait_for_shutdown_signal;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{AppState, ClientRecord, Config};
use crate::error::ServerError;
use crate::http::MediaTypes;
use crate::logger::{self, EventSink};

/// Extra time `stop` gives the accept loop beyond the drain grace period
const STOP_MARGIN: Duration = Duration::from_secs(1);

/// Settings that stay fixed across runs of one [`Server`]
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub media: MediaTypes,
    pub shutdown_grace: Duration,
    pub keep_alive: bool,
    /// Access log format, `None` disables access logging
    pub access_log: Option<String>,
}

impl ServerSettings {
    pub fn from_config(config: &Config) -> Result<Self, ServerError> {
        let host = config.get_host().map_err(ServerError::InvalidAddress)?;
        Ok(Self {
            host,
            media: config.media_types(),
            shutdown_grace: config.shutdown_grace(),
            keep_alive: config.performance.keep_alive,
            access_log: config
                .logging
                .access_log
                .then(|| config.logging.access_log_format.clone()),
        })
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            media: MediaTypes::default(),
            shutdown_grace: Duration::from_secs(5),
            keep_alive: true,
            access_log: None,
        }
    }
}

/// Externally visible lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    Stopped,
    Running { port: u16, root: PathBuf },
}

struct RunningServer {
    addr: SocketAddr,
    root: PathBuf,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

enum RuntimeState {
    Stopped,
    Running(RunningServer),
}

/// A file server that can be started and stopped repeatedly
///
/// Each run gets a fresh [`ClientRecord`]; the record of the last run stays
/// readable through [`Server::clients`] after `stop`.
pub struct Server {
    settings: ServerSettings,
    events: EventSink,
    state: RuntimeState,
    clients: Arc<ClientRecord>,
}

impl Server {
    pub fn new(settings: ServerSettings) -> Self {
        Self {
            settings,
            events: EventSink::disabled(),
            state: RuntimeState::Stopped,
            clients: Arc::new(ClientRecord::new()),
        }
    }

    /// Forward lifecycle and client events to `events`
    #[must_use]
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Start serving `root` on `port` (0 picks a free port)
    ///
    /// Returns the bound address. On error the server stays stopped.
    pub async fn start(&mut self, root: &Path, port: u16) -> Result<SocketAddr, ServerError> {
        if let RuntimeState::Running(running) = &self.state {
            return Err(ServerError::AlreadyRunning {
                port: running.addr.port(),
            });
        }

        let root = canonical_root(root).await?;

        let addr = SocketAddr::new(self.settings.host, port);
        let listener = create_listener(addr).map_err(|e| ServerError::from_bind(addr, e))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ServerError::Bind { addr, source: e })?;

        let mut app_state = AppState::new(root.clone(), self.settings.media.clone(), self.events.clone());
        if let Some(format) = &self.settings.access_log {
            app_state = app_state.with_access_log(format);
        }
        self.clients = Arc::clone(&app_state.clients);

        let shutdown = CancellationToken::new();
        let loop_config = ServerLoopConfig {
            keep_alive: self.settings.keep_alive,
            shutdown_grace: self.settings.shutdown_grace,
        };
        let task = tokio::spawn(start_server_loop(
            listener,
            Arc::new(app_state),
            shutdown.clone(),
            loop_config,
        ));

        logger::log_server_start(&self.events, &addr, &root);
        self.state = RuntimeState::Running(RunningServer {
            addr,
            root,
            shutdown,
            task,
        });
        Ok(addr)
    }

    /// Stop accepting, let in-flight responses finish, then return
    ///
    /// Connections still open after the grace period are closed.
    pub async fn stop(&mut self) -> Result<(), ServerError> {
        let RuntimeState::Running(running) =
            std::mem::replace(&mut self.state, RuntimeState::Stopped)
        else {
            return Err(ServerError::NotRunning);
        };

        let RunningServer {
            shutdown, mut task, ..
        } = running;
        shutdown.cancel();

        let limit = self.settings.shutdown_grace + STOP_MARGIN;
        match tokio::time::timeout(limit, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => logger::log_error(&format!("Accept loop ended abnormally: {e}")),
            Err(_) => {
                logger::log_warning("Accept loop did not finish in time, aborting it");
                task.abort();
                // Cancelled JoinError is expected here
                let _ = task.await;
            }
        }

        logger::log_server_stop(&self.events, self.clients.len());
        Ok(())
    }

    /// Start when stopped, stop when running
    pub async fn toggle(&mut self, root: &Path, port: u16) -> Result<ServerStatus, ServerError> {
        if self.is_running() {
            self.stop().await?;
        } else {
            self.start(root, port).await?;
        }
        Ok(self.status())
    }

    pub fn status(&self) -> ServerStatus {
        match &self.state {
            RuntimeState::Stopped => ServerStatus::Stopped,
            RuntimeState::Running(running) => ServerStatus::Running {
                port: running.addr.port(),
                root: running.root.clone(),
            },
        }
    }

    pub const fn is_running(&self) -> bool {
        matches!(self.state, RuntimeState::Running(_))
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            RuntimeState::Running(running) => Some(running.addr),
            RuntimeState::Stopped => None,
        }
    }

    /// Clients seen by the current run, or by the last one once stopped
    pub fn clients(&self) -> Arc<ClientRecord> {
        Arc::clone(&self.clients)
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        // The accept loop drains on its own once cancelled
        if let RuntimeState::Running(running) = &self.state {
            running.shutdown.cancel();
        }
    }
}

async fn canonical_root(root: &Path) -> Result<PathBuf, ServerError> {
    let invalid = |reason: String| ServerError::InvalidRoot {
        path: root.to_path_buf(),
        reason,
    };

    let canonical = tokio::fs::canonicalize(root)
        .await
        .map_err(|e| invalid(e.to_string()))?;
    let metadata = tokio::fs::metadata(&canonical)
        .await
        .map_err(|e| invalid(e.to_string()))?;

    if metadata.is_dir() {
        Ok(canonical)
    } else {
        Err(invalid("not a directory".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_settings() -> ServerSettings {
        ServerSettings {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            shutdown_grace: Duration::from_millis(200),
            ..ServerSettings::default()
        }
    }

    #[tokio::test]
    async fn test_stop_when_stopped() {
        let mut server = Server::new(local_settings());
        assert!(matches!(server.stop().await, Err(ServerError::NotRunning)));
        assert_eq!(server.status(), ServerStatus::Stopped);
    }

    #[tokio::test]
    async fn test_start_twice() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::new(local_settings());
        let addr = server.start(dir.path(), 0).await.unwrap();
        assert_ne!(addr.port(), 0);

        match server.start(dir.path(), 0).await {
            Err(ServerError::AlreadyRunning { port }) => assert_eq!(port, addr.port()),
            other => panic!("unexpected result: {other:?}"),
        }
        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();

        let mut server = Server::new(local_settings());
        assert!(matches!(
            server.start(&dir.path().join("missing"), 0).await,
            Err(ServerError::InvalidRoot { .. })
        ));
        assert!(matches!(
            server.start(&file, 0).await,
            Err(ServerError::InvalidRoot { .. })
        ));
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn test_port_in_use() {
        let dir = tempfile::tempdir().unwrap();
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let mut server = Server::new(local_settings());
        assert!(matches!(
            server.start(dir.path(), port).await,
            Err(ServerError::PortInUse { .. })
        ));
        assert_eq!(server.status(), ServerStatus::Stopped);
    }

    #[tokio::test]
    async fn test_restart_on_same_port() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let mut server = Server::new(local_settings());

        let port = server.start(dir.path(), 0).await.unwrap().port();
        assert_eq!(
            server.status(),
            ServerStatus::Running {
                port,
                root: root.clone()
            }
        );
        server.stop().await.unwrap();
        assert!(server.local_addr().is_none());

        let again = server.start(dir.path(), port).await.unwrap();
        assert_eq!(again.port(), port);
        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_toggle_and_events() {
        let dir = tempfile::tempdir().unwrap();
        let (events, mut rx) = EventSink::channel(16);
        let mut server = Server::new(local_settings()).with_events(events);

        let status = server.toggle(dir.path(), 0).await.unwrap();
        let ServerStatus::Running { port, .. } = status else {
            panic!("expected running, got {status:?}");
        };
        assert_eq!(server.toggle(dir.path(), 0).await.unwrap(), ServerStatus::Stopped);

        assert_eq!(rx.recv().await.unwrap(), format!("server started on port {port}"));
        assert!(rx.recv().await.unwrap().starts_with("shared directory: "));
        assert_eq!(rx.recv().await.unwrap(), "server stopped");
    }
}
