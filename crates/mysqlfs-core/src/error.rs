//! Error types for mysqlfs

use thiserror::Error;

use crate::ServerVersion;

/// Core error type for mysqlfs pool and backend operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Allocation error: {0}")]
    Allocation(String),

    #[error("Connection error on slot {slot}: {message}")]
    Connection { slot: usize, message: String },

    #[error("Server version {found} is too old, version {required} or higher is required")]
    Version {
        found: ServerVersion,
        required: ServerVersion,
    },

    #[error("Pool misuse: {0}")]
    Misuse(#[from] MisuseKind),

    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Check whether this error reports a violated pool contract
    pub fn is_misuse(&self) -> bool {
        matches!(self, Error::Misuse(_))
    }
}

/// Ways a caller can break the release contract of a pool
///
/// Releasing is bounds-checked and identity-checked; every violation fails
/// loudly with one of these instead of silently corrupting the slot table.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MisuseKind {
    #[error("lease was issued by a different pool")]
    ForeignPool,

    #[error("slot {slot} is outside the pool capacity {capacity}")]
    SlotOutOfRange { slot: usize, capacity: usize },

    #[error("slot {slot} is not checked out")]
    NotCheckedOut { slot: usize },

    #[error("lease for slot {slot} is stale (slot was released and acquired again)")]
    StaleLease { slot: usize },

    #[error("slot {slot} is held by a lease, not by a detached token")]
    AlreadyAttached { slot: usize },
}

/// Result type alias for mysqlfs operations
pub type Result<T> = std::result::Result<T, Error>;
