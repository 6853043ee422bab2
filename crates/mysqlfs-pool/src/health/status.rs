//! Latency classes and per-slot check results

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How quickly a pooled session answered its ping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    #[default]
    Healthy,
    /// Slower than the healthy threshold; stays in rotation
    Degraded,
    /// Slower than the degraded threshold; the slot is flagged broken
    Unhealthy,
}

impl HealthStatus {
    /// Classify a ping round trip against [`HealthThresholds::default`].
    ///
    /// ```
    /// use mysqlfs_pool::health::HealthStatus;
    /// use std::time::Duration;
    ///
    /// assert_eq!(HealthStatus::from_latency(Duration::from_millis(50)), HealthStatus::Healthy);
    /// assert_eq!(HealthStatus::from_latency(Duration::from_millis(200)), HealthStatus::Degraded);
    /// assert_eq!(HealthStatus::from_latency(Duration::from_millis(1000)), HealthStatus::Unhealthy);
    /// ```
    pub fn from_latency(latency: Duration) -> Self {
        Self::from_latency_with_thresholds(latency, &HealthThresholds::default())
    }

    pub fn from_latency_with_thresholds(latency: Duration, thresholds: &HealthThresholds) -> Self {
        if latency <= thresholds.healthy_threshold {
            HealthStatus::Healthy
        } else if latency <= thresholds.degraded_threshold {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        }
    }

    /// Whether a slot answering with this status may be handed out.
    pub fn is_usable(&self) -> bool {
        !matches!(self, HealthStatus::Unhealthy)
    }
}

/// Latency limits separating the three [`HealthStatus`] classes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthThresholds {
    pub healthy_threshold: Duration,
    pub degraded_threshold: Duration,
}

impl HealthThresholds {
    /// The degraded limit is raised to the healthy one if given lower.
    pub fn new(healthy_ms: u64, degraded_ms: u64) -> Self {
        Self {
            healthy_threshold: Duration::from_millis(healthy_ms),
            degraded_threshold: Duration::from_millis(degraded_ms.max(healthy_ms)),
        }
    }
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self::new(100, 500)
    }
}

/// Settings for [`SessionPool::check_health`](crate::SessionPool::check_health)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckConfig {
    pub thresholds: HealthThresholds,
    /// A ping still pending after this long counts as failed
    pub ping_timeout: Duration,
}

impl HealthCheckConfig {
    pub fn with_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            thresholds: HealthThresholds::default(),
            ping_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of checking one slot
#[derive(Debug, Clone, PartialEq)]
pub enum SlotCheck {
    /// The session answered. The slot is back in rotation unless `status`
    /// is [`HealthStatus::Unhealthy`].
    Responded {
        slot: usize,
        status: HealthStatus,
        latency: Duration,
    },
    /// The ping failed or timed out; the slot is now flagged broken
    Failed { slot: usize, error: String },
    /// The slot was checked out and left alone
    Skipped { slot: usize },
}

impl SlotCheck {
    pub fn slot(&self) -> usize {
        match self {
            SlotCheck::Responded { slot, .. }
            | SlotCheck::Failed { slot, .. }
            | SlotCheck::Skipped { slot } => *slot,
        }
    }

    /// Whether this check leaves the slot flagged broken
    pub fn marks_broken(&self) -> bool {
        match self {
            SlotCheck::Responded { status, .. } => !status.is_usable(),
            SlotCheck::Failed { .. } => true,
            SlotCheck::Skipped { .. } => false,
        }
    }
}
