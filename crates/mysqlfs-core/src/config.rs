//! Backend connection configuration

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Options group read from the client option files when none is configured.
pub const DEFAULT_OPTIONS_GROUP: &str = "mysqlfs";

/// Endpoint, credentials and target database for a backend session.
///
/// Every field is optional; a backend fills unset fields from the named
/// options group and then from its own defaults. `host`/`port` and
/// `socket_path` address the same server over different transports.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Host name or IP address
    pub host: Option<String>,
    /// TCP port
    pub port: Option<u16>,
    /// Unix socket path, used instead of TCP when set
    pub socket_path: Option<PathBuf>,
    /// User name
    pub user: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Database to select after connecting
    pub database: Option<String>,
    /// Named client-options profile
    pub options_group: Option<String>,
}

impl BackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = Some(path.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_options_group(mut self, group: impl Into<String>) -> Self {
        self.options_group = Some(group.into());
        self
    }

    /// The options group to read, falling back to [`DEFAULT_OPTIONS_GROUP`].
    pub fn options_group(&self) -> &str {
        self.options_group.as_deref().unwrap_or(DEFAULT_OPTIONS_GROUP)
    }

    pub fn socket_path(&self) -> Option<&Path> {
        self.socket_path.as_deref()
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("socket_path", &self.socket_path)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("options_group", &self.options_group)
            .finish()
    }
}
