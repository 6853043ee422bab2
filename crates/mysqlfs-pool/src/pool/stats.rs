//! Pool statistics types

use serde::{Deserialize, Serialize};

/// Observable state of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// Available to the next `acquire`
    Free,
    /// Checked out by a caller
    Busy,
    /// Free but flagged as unusable; skipped by `acquire` until a health
    /// check succeeds on it
    Broken,
}

/// Statistics about a session pool's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of slots
    capacity: usize,
    /// Slots currently checked out
    busy: usize,
    /// Slots not checked out but flagged broken
    broken: usize,
}

impl PoolStats {
    pub fn new(capacity: usize, busy: usize, broken: usize) -> Self {
        Self {
            capacity,
            busy,
            broken,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn busy(&self) -> usize {
        self.busy
    }

    pub fn broken(&self) -> usize {
        self.broken
    }

    /// Slots the next `acquire` could hand out
    pub fn free(&self) -> usize {
        self.capacity.saturating_sub(self.busy + self.broken)
    }

    /// Calculate pool utilization as a fraction (0.0 to 1.0)
    ///
    /// Returns 0.0 for an empty pool.
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.busy as f64 / self.capacity as f64
        }
    }

    /// Whether `acquire` would currently return `None`
    pub fn is_exhausted(&self) -> bool {
        self.free() == 0
    }
}

/// Outcome of tearing a pool down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownReport {
    /// Sessions closed cleanly
    pub closed: usize,
    /// Sessions whose close returned an error
    pub failed: usize,
    /// Sessions a caller had already closed; not closed a second time
    pub already_closed: usize,
    /// Slots still checked out through a detached token at shutdown
    pub outstanding: usize,
}
