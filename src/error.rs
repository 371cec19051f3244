//! Error types for the server lifecycle.
//!
//! Request-level failures never show up here: they are answered with an
//! HTTP status (404, 405, 416) by the handlers.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`crate::server::Server`] lifecycle operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening address is already taken by another socket.
    #[error("Port {} is already in use on {addr}", addr.port())]
    PortInUse {
        /// Address that could not be bound
        addr: SocketAddr,
        /// Underlying bind error
        #[source]
        source: std::io::Error,
    },

    /// Binding the listener failed for a reason other than the port being taken.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address that could not be bound
        addr: SocketAddr,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// `start` was called while the server is running.
    #[error("Server is already running on port {port}")]
    AlreadyRunning {
        /// Port of the running server
        port: u16,
    },

    /// `stop` was called while the server is stopped.
    #[error("Server is not running")]
    NotRunning,

    /// The shared directory does not exist or is not a directory.
    #[error("Invalid shared directory '{}': {reason}", path.display())]
    InvalidRoot {
        /// Directory as given by the caller
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// The configured host is not a valid IP address.
    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),
}

impl ServerError {
    /// Classify a bind failure
    pub fn from_bind(addr: SocketAddr, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::AddrInUse {
            Self::PortInUse { addr, source }
        } else {
            Self::Bind { addr, source }
        }
    }
}
