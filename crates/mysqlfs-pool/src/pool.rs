//! Fixed-capacity session pool
//!
//! All sessions are opened together when the pool is built and closed
//! together when it is shut down. In between, callers check sessions out
//! and back in; a full pool answers `None` straight away rather than making
//! the caller wait.
//!
//! # Example
//!
//! ```ignore
//! use mysqlfs_driver_mysql::MySqlBackend;
//! use mysqlfs_pool::{PoolConfig, SessionPool};
//!
//! let config = PoolConfig::load("/etc/mysqlfs/pool.toml")?;
//! let pool = SessionPool::init(&config, &MySqlBackend::new()).await?;
//!
//! if let Some(session) = pool.acquire() {
//!     // Use session...
//!     pool.release(session)?;
//! }
//!
//! pool.shutdown().await;
//! ```

mod config;
mod lease;
mod pool;
mod stats;


pub use config::{DEFAULT_CONNECTION_COUNT, PoolConfig};
pub use lease::{PooledSession, SlotToken};
pub use pool::SessionPool;
pub use stats::{PoolStats, ShutdownReport, SlotState};
