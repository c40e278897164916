//! Server configuration read from the environment.
//!
//! A `.env` file is loaded first (see `main`), then:
//! - `HOST` bind address (default `0.0.0.0`)
//! - `PORT` listen port (default `5000`)
//! - `STORAGE_PATH` Sled database directory (default `./data/creations.sled`)

use std::net::{IpAddr, SocketAddr};

use crate::storage::StorageConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_STORAGE_PATH: &str = "./data/creations.sled";

/// Errors that can occur while reading configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid host: {0}")]
    InvalidHost(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime configuration for the creation server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub storage_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            storage_path: DEFAULT_STORAGE_PATH.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host_str = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host_str
            .parse()
            .map_err(|_| ConfigError::InvalidHost(host_str.clone()))?;

        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort(value.clone()))?,
            None => DEFAULT_PORT,
        };

        let storage_path =
            lookup("STORAGE_PATH").unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string());

        let config = Self {
            host,
            port,
            storage_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.trim().is_empty() {
            return Err(ConfigError::Invalid("STORAGE_PATH is empty".to_string()));
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn storage(&self) -> StorageConfig {
        StorageConfig::new(&self.storage_path)
    }
}
