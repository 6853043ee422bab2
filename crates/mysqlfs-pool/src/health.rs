//! Health checking for pooled sessions
//!
//! Backend sessions reconnect on their own, so a slot can hand out a session
//! whose link is gone. These checks make that visible: each free slot is
//! pinged, slow or failing sessions are classified, and failing slots are
//! flagged broken so `acquire` skips them until a later check succeeds.
//!
//! # Example
//!
//! ```ignore
//! use mysqlfs_pool::health::HealthCheckConfig;
//!
//! let report = pool.check_health(&HealthCheckConfig::default()).await;
//! for check in report {
//!     println!("{:?}", check);
//! }
//! ```

mod ping;
mod status;


pub use ping::{PingError, PingResult, ping_session};
pub use status::{HealthCheckConfig, HealthStatus, HealthThresholds, SlotCheck};
