// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory shared over HTTP
    pub root: PathBuf,
    pub workers: Option<usize>,
}

/// Media streaming configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    /// Extensions always served through the ranged path (without the dot)
    pub extensions: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (short, combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Log file path (optional, stdout if not set)
    #[serde(default)]
    pub file: Option<String>,
    /// Capacity of the event channel handed to a control surface
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "short".to_string()
}

const fn default_event_buffer() -> usize {
    256
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PerformanceConfig {
    /// How long `stop` waits for in-flight responses before closing them
    pub shutdown_grace_ms: u64,
    pub keep_alive: bool,
}
