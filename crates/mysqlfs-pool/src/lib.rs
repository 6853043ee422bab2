//! mysqlfs Pool - Bounded pool of backend sessions for the filesystem server
//!
//! Filesystem operations are short and numerous; opening a backend session
//! for each one is too slow and unbounded. This crate keeps a fixed set of
//! sessions open and hands them out to worker threads one at a time.

pub mod health;
#[cfg(test)]
mod mock;
pub mod pool;

pub use health::{HealthCheckConfig, HealthStatus, HealthThresholds, PingError, SlotCheck};
pub use mysqlfs_core::{Error, MisuseKind, Result};
pub use pool::{
    PoolConfig, PoolStats, PooledSession, SessionPool, ShutdownReport, SlotState, SlotToken,
};
