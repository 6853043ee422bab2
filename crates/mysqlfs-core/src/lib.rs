//! mysqlfs Core - Core abstractions shared by the session pool and its backends
//!
//! This crate provides the fundamental traits and types that the other
//! mysqlfs crates depend on. It defines:
//!
//! - `Backend` - Trait for something that can open backend sessions
//! - `Session` - Trait for one live, stateful backend session
//! - `BackendConfig` - Endpoint, credentials and options group for a backend
//! - `ServerVersion` - Backend server version used to gate pool creation
//! - `Error` - The error type used across the workspace

mod config;
mod error;
pub mod logging;
mod session;
mod version;

pub use config::*;
pub use error::*;
pub use session::*;
pub use version::*;
