//! Backend and session traits

use std::sync::Arc;

use async_trait::async_trait;

use crate::{BackendConfig, Result, ServerVersion};

/// Client-side options that can be applied to a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOption {
    /// Transparently re-establish the session when the link drops.
    AutoReconnect(bool),
}

/// One live, stateful session to the backend service.
///
/// A `Session` value only exists once its connection has been established,
/// so options set through [`Session::set_option`] always apply to a live
/// connection.
#[async_trait]
pub trait Session: Send + Sync + 'static {
    /// Apply a client-side option to this session
    fn set_option(&self, option: SessionOption) -> Result<()>;

    /// Version reported by the server during the handshake
    fn server_version(&self) -> ServerVersion;

    /// Human readable server description, defaults to the version
    fn server_info(&self) -> String {
        self.server_version().to_string()
    }

    /// Round-trip to the server to check the session is usable
    async fn ping(&self) -> Result<()>;

    /// Close the session. Closing twice is a no-op.
    async fn close(&self) -> Result<()>;

    /// Check if the session is closed
    fn is_closed(&self) -> bool;
}

/// Something that can open sessions to a backend service
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    type Session: Session;

    /// Backend name used in logs (e.g. "mysql")
    fn name(&self) -> &'static str;

    /// Establish a new session
    async fn connect(&self, config: &BackendConfig) -> Result<Self::Session>;
}

#[async_trait]
impl<T: Backend> Backend for Arc<T> {
    type Session = T::Session;

    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn connect(&self, config: &BackendConfig) -> Result<Self::Session> {
        (**self).connect(config).await
    }
}
