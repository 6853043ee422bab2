//! Session ping with timing

use std::time::{Duration, Instant};

use mysqlfs_core::Session;
use thiserror::Error;

/// Result of a ping operation
pub type PingResult = Result<Duration, PingError>;

/// Error that can occur during a ping operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PingError {
    #[error("Session is closed")]
    SessionClosed,

    #[error("Ping failed: {0}")]
    Failed(String),

    #[error("Ping timed out after {0:?}")]
    Timeout(Duration),
}

/// Ping a session and return the round-trip time.
///
/// A closed session is reported without touching the backend.
pub async fn ping_session<S: Session + ?Sized>(session: &S, timeout: Duration) -> PingResult {
    if session.is_closed() {
        return Err(PingError::SessionClosed);
    }

    let start = Instant::now();
    match tokio::time::timeout(timeout, session.ping()).await {
        Ok(Ok(())) => Ok(start.elapsed()),
        Ok(Err(e)) => Err(PingError::Failed(e.to_string())),
        Err(_) => Err(PingError::Timeout(timeout)),
    }
}
