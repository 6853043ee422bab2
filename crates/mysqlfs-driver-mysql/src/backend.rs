//! MySQL backend implementation

use std::path::PathBuf;

use async_trait::async_trait;
use mysql_async::{Conn, Opts, OptsBuilder};
use mysqlfs_core::{Backend, BackendConfig, Error, Result};

use crate::MySqlSession;
use crate::option_file::{default_option_files, read_option_groups};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;

/// MySQL/MariaDB backend
///
/// Unset connection fields are read from the configured options group in the
/// client option files before connecting.
#[derive(Debug, Clone)]
pub struct MySqlBackend {
    option_files: Vec<PathBuf>,
}

impl MySqlBackend {
    /// Create a backend that reads the standard option files
    pub fn new() -> Self {
        tracing::debug!("MySQL backend initialized");
        Self {
            option_files: default_option_files(),
        }
    }

    /// Create a backend that reads only the given option files
    pub fn with_option_files(option_files: Vec<PathBuf>) -> Self {
        Self { option_files }
    }

    pub fn option_files(&self) -> &[PathBuf] {
        &self.option_files
    }

    /// Resolve `config` against the option files
    pub fn resolve(&self, config: &BackendConfig) -> Result<BackendConfig> {
        let values = read_option_groups(&self.option_files, config.options_group())?;
        values.fill(config)
    }
}

impl Default for MySqlBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Build `mysql_async` options from a fully resolved configuration
pub fn build_opts(config: &BackendConfig) -> Opts {
    let mut builder = OptsBuilder::default()
        .ip_or_hostname(config.host.as_deref().unwrap_or(DEFAULT_HOST))
        .tcp_port(config.port.unwrap_or(DEFAULT_PORT))
        .user(config.user.as_deref())
        .pass(config.password.as_deref())
        .db_name(config.database.as_deref());

    if let Some(socket) = config.socket_path() {
        builder = builder.socket(Some(socket.to_string_lossy().into_owned()));
    }

    builder.into()
}

#[async_trait]
impl Backend for MySqlBackend {
    type Session = MySqlSession;

    fn name(&self) -> &'static str {
        "mysql"
    }

    #[tracing::instrument(skip(self, config), fields(group = %config.options_group()))]
    async fn connect(&self, config: &BackendConfig) -> Result<MySqlSession> {
        let resolved = self.resolve(config)?;
        let opts = build_opts(&resolved);

        let conn = Conn::new(opts.clone()).await.map_err(|e| {
            tracing::error!(error = %e, "failed to connect to MySQL server");
            Error::Session(e.to_string())
        })?;

        tracing::info!(
            host = %opts.ip_or_hostname(),
            port = opts.tcp_port(),
            database = ?opts.db_name(),
            "MySQL session established"
        );
        Ok(MySqlSession::new(conn, opts))
    }
}
