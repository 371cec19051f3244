// Configuration module entry point
// Loads file/environment configuration and holds per-run application state

mod state;
mod types;

use std::net::IpAddr;
use std::time::Duration;

// Re-export public types
pub use state::{AppState, ClientRecord};
pub use types::{Config, LoggingConfig, MediaConfig, PerformanceConfig, ServerConfig};

use crate::http::MediaTypes;

/// Default config file, looked up with any supported extension
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// A missing file is not an error; defaults and `LAN_SHARE__*`
    /// environment variables still apply.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("LAN_SHARE").separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5555)?
            .set_default("server.root", ".")?
            .set_default("media.extensions", vec!["mp4", "mkv", "avi"])?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "short")?
            .set_default("logging.event_buffer", 256)?
            .set_default("performance.shutdown_grace_ms", 5000)?
            .set_default("performance.keep_alive", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_host(&self) -> Result<IpAddr, String> {
        self.server
            .host
            .parse()
            .map_err(|e| format!("Invalid host '{}': {e}", self.server.host))
    }

    pub fn media_types(&self) -> MediaTypes {
        MediaTypes::new(&self.media.extensions)
    }

    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.performance.shutdown_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely/not/here/config").unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 5555);
        assert_eq!(cfg.server.root, PathBuf::from("."));
        assert_eq!(cfg.media.extensions, vec!["mp4", "mkv", "avi"]);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.event_buffer, 256);
        assert_eq!(cfg.shutdown_grace(), Duration::from_secs(5));
        assert!(cfg.media_types().is_media(Path::new("x.mkv")));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("share.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 8088\nroot = \"/srv/media\"\n\n[media]\nextensions = [\"webm\"]\n\n[performance]\nshutdown_grace_ms = 250"
        )
        .unwrap();

        let base = dir.path().join("share");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 8088);
        assert_eq!(cfg.server.root, PathBuf::from("/srv/media"));
        assert_eq!(cfg.shutdown_grace(), Duration::from_millis(250));
        assert!(cfg.media_types().is_media(Path::new("a.webm")));
        assert!(!cfg.media_types().is_media(Path::new("a.mp4")));
    }

    #[test]
    fn test_invalid_host() {
        let mut cfg = Config::load_from("definitely/not/here/config").unwrap();
        cfg.server.host = "not-an-ip".to_string();
        assert!(cfg.get_host().is_err());
    }
}
