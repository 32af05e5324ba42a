//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/exchange-map/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use crate::store::JsonFileStore;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Geocoder settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Data file locations
    #[serde(default)]
    pub data: DataConfig,

    /// Admin access
    #[serde(default)]
    pub admin: AdminConfig,
}

/// Geocoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of a Nominatim-compatible service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Identifying User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Pause after each geocoder request in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served at `/`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Data file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Exchange file read on first start
    #[serde(default = "default_csv_path")]
    pub csv_path: String,

    /// Persisted store file; empty means the XDG data directory
    #[serde(default)]
    pub store_path: String,
}

/// Admin access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Shared admin password
    #[serde(default = "default_password")]
    pub password: String,

    /// Session lifetime in seconds
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,
}

// Default value functions for serde
fn default_endpoint() -> String {
    DEFAULT_GEOCODER_ENDPOINT.to_string()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_interval_ms() -> u64 {
    DEFAULT_GEOCODE_INTERVAL_MS
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_static_dir() -> String {
    DEFAULT_STATIC_DIR.to_string()
}
fn default_csv_path() -> String {
    DEFAULT_CSV_PATH.to_string()
}
fn default_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}
fn default_session_timeout() -> u64 {
    DEFAULT_SESSION_TIMEOUT_SECS
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            store_path: String::new(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: default_password(),
            session_timeout_secs: default_session_timeout(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoding", "endpoint"] => Some(self.geocoding.endpoint.clone()),
            ["geocoding", "user_agent"] => Some(self.geocoding.user_agent.clone()),
            ["geocoding", "interval_ms"] => Some(self.geocoding.interval_ms.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "static_dir"] => Some(self.server.static_dir.clone()),

            ["data", "csv_path"] => Some(self.data.csv_path.clone()),
            ["data", "store_path"] => Some(self.data.store_path.clone()),

            ["admin", "password"] => Some(self.admin.password.clone()),
            ["admin", "session_timeout_secs"] => {
                Some(self.admin.session_timeout_secs.to_string())
            }

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoding", "endpoint"] => {
                self.geocoding.endpoint = value.to_string();
            }
            ["geocoding", "user_agent"] => {
                self.geocoding.user_agent = value.to_string();
            }
            ["geocoding", "interval_ms"] => {
                self.geocoding.interval_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid interval value: {}", value))
                })?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }
            ["server", "static_dir"] => {
                self.server.static_dir = value.to_string();
            }

            ["data", "csv_path"] => {
                self.data.csv_path = value.to_string();
            }
            ["data", "store_path"] => {
                self.data.store_path = value.to_string();
            }

            ["admin", "password"] => {
                if value.is_empty() {
                    return Err(Error::Config("Admin password cannot be empty".to_string()));
                }
                self.admin.password = value.to_string();
            }
            ["admin", "session_timeout_secs"] => {
                self.admin.session_timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "geocoding.endpoint",
            "geocoding.user_agent",
            "geocoding.interval_ms",
            "server.host",
            "server.port",
            "server.static_dir",
            "data.csv_path",
            "data.store_path",
            "admin.password",
            "admin.session_timeout_secs",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Pause between geocoder requests
    pub fn geocode_interval(&self) -> Duration {
        Duration::from_millis(self.geocoding.interval_ms)
    }

    /// Path of the persisted store file
    pub fn store_path(&self) -> Result<PathBuf> {
        if self.data.store_path.is_empty() {
            JsonFileStore::default_path()
        } else {
            Ok(PathBuf::from(&self.data.store_path))
        }
    }
}
