//! # API Server Configuration
//!
//! ## Load Order (later overrides earlier)
//! 1. Default values
//! 2. Config file (`--config <path>`, else `<config dir>/klinik/api.toml`)
//! 3. Environment variables (`KLINIK_*`)
//!
//! ## Example config file
//! ```toml
//! [server]
//! bind_addr = "127.0.0.1"
//! port = 2022
//!
//! [database]
//! path = "/var/lib/klinik/klinik.db"
//! max_connections = 5
//!
//! [logging]
//! filter = "klinik_api=debug,klinik_db=info"
//! ```

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use klinik_db::DbConfig;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 2022;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind (default: all interfaces)
    pub bind_addr: String,

    /// Port (default: 2022)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path
    pub path: PathBuf,

    /// Pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: PathBuf::from("./klinik.db"),
            max_connections: 5,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "klinik_api=info,klinik_db=info,tower_http=info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// An explicit `config_path` must exist; the default location is
    /// optional.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading API config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `KLINIK_*` overrides read through `lookup`.
    ///
    /// `SERVER_PORT` is honoured as a fallback for `KLINIK_PORT`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("KLINIK_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("KLINIK_PORT").or_else(|| lookup("SERVER_PORT")) {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(port = %port, "Ignoring unparseable port in environment"),
            }
        }

        if let Some(path) = lookup("KLINIK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(filter) = lookup("KLINIK_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port".into()));
        }
        if self.server.bind_addr.parse::<IpAddr>().is_err() {
            return Err(ConfigError::InvalidValue("server.bind_addr".into()));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("database.path".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue("database.max_connections".into()));
        }
        Ok(())
    }

    /// Address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .server
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue("server.bind_addr".into()))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Store configuration for `klinik_db::Database::new`.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "klinik").map(|dirs| dirs.config_dir().join("api.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.server.port, 2022);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:2022");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ApiConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [database]
            path = "/tmp/klinik-test.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.database.path, PathBuf::from("/tmp/klinik-test.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ApiConfig::default();
        config.apply_overrides(env(&[
            ("KLINIK_BIND_ADDR", "127.0.0.1"),
            ("KLINIK_PORT", "9000"),
            ("KLINIK_DB_PATH", "/data/klinik.db"),
            ("KLINIK_LOG", "debug"),
        ]));

        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.database.path, PathBuf::from("/data/klinik.db"));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_server_port_fallback_and_bad_port() {
        let mut config = ApiConfig::default();
        config.apply_overrides(env(&[("SERVER_PORT", "3001")]));
        assert_eq!(config.server.port, 3001);

        config.apply_overrides(env(&[("KLINIK_PORT", "not-a-port")]));
        assert_eq!(config.server.port, 3001);
    }

    #[test]
    fn test_validation() {
        let mut config = ApiConfig::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(f)) if f == "server.port"));

        let mut config = ApiConfig::default();
        config.server.bind_addr = "localhost:80".into();
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ApiConfig::load(Some(Path::new("/nonexistent/klinik/api.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&ApiConfig::default()).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[logging]"));
    }
}
