//! In-memory backend for pool and health tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mysqlfs_core::{
    Backend, BackendConfig, Error, Result, ServerVersion, Session, SessionOption,
};

/// Counters shared by a mock backend and every session it opened
#[derive(Debug, Default)]
pub(crate) struct MockStats {
    pub connects: AtomicUsize,
    /// Every call to `close`, including repeated ones
    pub closes: AtomicUsize,
    /// Sessions opened and not yet closed
    pub open: AtomicUsize,
}

impl MockStats {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockSession {
    pub id: usize,
    version: ServerVersion,
    auto_reconnect: AtomicBool,
    /// `set_option` fails for this session
    reject_options: bool,
    ping_delay: Duration,
    closed: AtomicBool,
    /// Shared with the backend so tests can take the "server" down
    reachable: Arc<AtomicBool>,
    stats: Arc<MockStats>,
    /// Set while a caller holds this session; a second concurrent holder trips it
    in_use: AtomicBool,
    pub group: String,
}

impl MockSession {
    pub fn auto_reconnect(&self) -> bool {
        self.auto_reconnect.load(Ordering::SeqCst)
    }

    /// Mark the session as used by the caller; returns false if someone else
    /// already holds it.
    pub fn enter(&self) -> bool {
        !self.in_use.swap(true, Ordering::SeqCst)
    }

    pub fn leave(&self) {
        self.in_use.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl Session for MockSession {
    fn set_option(&self, option: SessionOption) -> Result<()> {
        if self.reject_options {
            return Err(Error::Session("unsupported option".into()));
        }
        match option {
            SessionOption::AutoReconnect(enabled) => {
                self.auto_reconnect.store(enabled, Ordering::SeqCst)
            }
        }
        Ok(())
    }

    fn server_version(&self) -> ServerVersion {
        self.version
    }

    async fn ping(&self) -> Result<()> {
        if !self.ping_delay.is_zero() {
            tokio::time::sleep(self.ping_delay).await;
        }
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Session("server has gone away".into()))
        }
    }

    async fn close(&self) -> Result<()> {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.stats.open.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockBackend {
    version: ServerVersion,
    /// Connect attempt (zero-based) that fails
    fail_at: Option<usize>,
    /// Connect attempt whose session rejects `set_option`
    reject_options_at: Option<usize>,
    ping_delay: Duration,
    reachable: Arc<AtomicBool>,
    pub stats: Arc<MockStats>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            version: ServerVersion::new(8, 0, 36),
            fail_at: None,
            reject_options_at: None,
            ping_delay: Duration::ZERO,
            reachable: Arc::new(AtomicBool::new(true)),
            stats: Arc::new(MockStats::default()),
        }
    }

    pub fn with_version(mut self, version: ServerVersion) -> Self {
        self.version = version;
        self
    }

    pub fn failing_at(mut self, attempt: usize) -> Self {
        self.fail_at = Some(attempt);
        self
    }

    pub fn rejecting_options_at(mut self, attempt: usize) -> Self {
        self.reject_options_at = Some(attempt);
        self
    }

    pub fn with_ping_delay(mut self, delay: Duration) -> Self {
        self.ping_delay = delay;
        self
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl Backend for MockBackend {
    type Session = MockSession;

    fn name(&self) -> &'static str {
        "mock"
    }

    async fn connect(&self, config: &BackendConfig) -> Result<MockSession> {
        let attempt = self.stats.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(attempt) {
            return Err(Error::Session("Access denied for user 'fs'@'localhost'".into()));
        }

        self.stats.open.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession {
            id: attempt,
            version: self.version,
            auto_reconnect: AtomicBool::new(false),
            reject_options: self.reject_options_at == Some(attempt),
            ping_delay: self.ping_delay,
            closed: AtomicBool::new(false),
            reachable: self.reachable.clone(),
            stats: self.stats.clone(),
            in_use: AtomicBool::new(false),
            group: config.options_group().to_string(),
        })
    }
}
