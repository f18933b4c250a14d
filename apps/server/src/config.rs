//! Server configuration, loaded from environment variables with defaults.

use std::env;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port.
    pub http_port: u16,

    /// Directory holding master.db and the per-mode store files.
    pub data_dir: PathBuf,

    /// Path of the installed license blob.
    pub license_path: PathBuf,
}

impl ServerConfig {
    /// Loads configuration from the environment.
    ///
    /// | Variable       | Default              |
    /// |----------------|----------------------|
    /// | `PORT`         | 4000                 |
    /// | `DATA_DIR`     | ./data               |
    /// | `LICENSE_PATH` | DATA_DIR/license.lic |
    pub fn load() -> Result<Self, ConfigError> {
        let http_port = env::var("PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?;

        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()));

        let license_path = env::var("LICENSE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("license.lic"));

        Ok(ServerConfig {
            http_port,
            data_dir,
            license_path,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
