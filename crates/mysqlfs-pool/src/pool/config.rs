//! Pool configuration types

use std::path::Path;

use mysqlfs_core::{BackendConfig, Error, MINIMUM_SERVER_VERSION, Result, ServerVersion};
use serde::{Deserialize, Serialize};

/// Number of slots used when the configuration does not say.
pub const DEFAULT_CONNECTION_COUNT: i64 = 5;

/// Configuration for a session pool
///
/// Backend fields sit at the top level next to the pool fields, so a TOML
/// file reads:
///
/// ```toml
/// connection_count = 8
/// host = "db.internal"
/// user = "fs"
/// database = "fsdata"
/// options_group = "mysqlfs"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of slots. Signed because it comes from user input; negative
    /// values are rejected when the pool is built.
    connection_count: i64,
    /// Oldest backend server version the pool accepts
    minimum_server_version: ServerVersion,
    /// Endpoint, credentials and options group for every slot
    #[serde(flatten)]
    backend: BackendConfig,
}

impl PoolConfig {
    pub fn new(connection_count: i64) -> Self {
        Self {
            connection_count,
            minimum_server_version: MINIMUM_SERVER_VERSION,
            backend: BackendConfig::default(),
        }
    }

    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_minimum_server_version(mut self, version: ServerVersion) -> Self {
        self.minimum_server_version = version;
        self
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), connection_count = config.connection_count, "loaded pool configuration");
        Ok(config)
    }

    pub fn connection_count(&self) -> i64 {
        self.connection_count
    }

    pub fn minimum_server_version(&self) -> ServerVersion {
        self.minimum_server_version
    }

    pub fn backend(&self) -> &BackendConfig {
        &self.backend
    }

    /// Validated slot count
    pub fn capacity(&self) -> Result<usize> {
        usize::try_from(self.connection_count).map_err(|_| {
            Error::Config(format!(
                "connection_count must be zero or greater, got {}",
                self.connection_count
            ))
        })
    }
}

impl Default for PoolConfig {
    /// Defaults:
    /// - connection_count: 5
    /// - minimum_server_version: 5.0.0
    /// - backend: everything from the `mysqlfs` options group
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTION_COUNT)
    }
}
