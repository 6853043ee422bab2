//! MySQL session implementation

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts};
use mysqlfs_core::{Error, Result, ServerVersion, Session, SessionOption};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

/// One live MySQL connection.
///
/// `mysql_async` has no client-side reconnect option, so auto-reconnect is
/// implemented here: with it enabled, a failed ping or a lost connection is
/// replaced by a fresh one built from the options the session was opened
/// with.
pub struct MySqlSession {
    conn: Mutex<Option<Conn>>,
    opts: Opts,
    server_version: AtomicU64,
    auto_reconnect: AtomicBool,
    closed: AtomicBool,
}

impl MySqlSession {
    pub(crate) fn new(conn: Conn, opts: Opts) -> Self {
        let server_version = ServerVersion::from(conn.server_version()).as_numeric();
        Self {
            conn: Mutex::new(Some(conn)),
            opts,
            server_version: AtomicU64::new(server_version),
            auto_reconnect: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn auto_reconnect(&self) -> bool {
        self.auto_reconnect.load(Ordering::SeqCst)
    }

    /// Lock the underlying connection for running statements.
    ///
    /// Reconnects first if the connection was lost and auto-reconnect is on.
    pub async fn connection(&self) -> Result<MappedMutexGuard<'_, Conn>> {
        self.ensure_open()?;
        let mut guard = self.conn.lock().await;
        if guard.is_none() {
            self.reconnect_locked(&mut guard).await?;
        }
        MutexGuard::try_map(guard, |conn| conn.as_mut())
            .map_err(|_| Error::Session("MySQL connection is not available".into()))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::Session("MySQL session is closed".into()));
        }
        Ok(())
    }

    async fn reconnect_locked(&self, guard: &mut MutexGuard<'_, Option<Conn>>) -> Result<()> {
        if !self.auto_reconnect() {
            return Err(Error::Session(
                "MySQL connection lost and auto-reconnect is disabled".into(),
            ));
        }

        if let Some(stale) = guard.take() {
            // The link is already broken, a failed goodbye is expected.
            let _ = stale.disconnect().await;
        }

        tracing::info!(host = %self.opts.ip_or_hostname(), "reconnecting MySQL session");
        let conn = Conn::new(self.opts.clone()).await.map_err(|e| {
            tracing::error!(error = %e, "MySQL reconnect failed");
            Error::Session(format!("Failed to reconnect to MySQL: {}", e))
        })?;
        self.server_version.store(
            ServerVersion::from(conn.server_version()).as_numeric(),
            Ordering::SeqCst,
        );
        **guard = Some(conn);
        Ok(())
    }
}

#[async_trait]
impl Session for MySqlSession {
    fn set_option(&self, option: SessionOption) -> Result<()> {
        match option {
            SessionOption::AutoReconnect(enabled) => {
                tracing::debug!(enabled, "setting MySQL auto-reconnect");
                self.auto_reconnect.store(enabled, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    fn server_version(&self) -> ServerVersion {
        ServerVersion::from_numeric(self.server_version.load(Ordering::SeqCst))
    }

    fn server_info(&self) -> String {
        format!("MySQL {}", self.server_version())
    }

    async fn ping(&self) -> Result<()> {
        self.ensure_open()?;
        let mut guard = self.conn.lock().await;

        let result = match guard.as_mut() {
            Some(conn) => conn
                .ping()
                .await
                .map_err(|e| Error::Session(format!("MySQL ping failed: {}", e))),
            None => Err(Error::Session("MySQL connection is not available".into())),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if self.auto_reconnect() => {
                tracing::warn!(error = %e, "MySQL ping failed, attempting reconnect");
                self.reconnect_locked(&mut guard).await
            }
            Err(e) => Err(e),
        }
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.conn.lock().await;
        self.closed.store(true, Ordering::SeqCst);

        match guard.take() {
            Some(conn) => conn
                .disconnect()
                .await
                .map_err(|e| Error::Session(format!("Failed to close MySQL connection: {}", e))),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
