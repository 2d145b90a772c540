//! Fair queue and scheduler configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_tau_ms() -> u64 {
    100
}

const fn default_unbounded() -> u32 {
    u32::MAX
}

/// Operating parameters of a fair queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairQueueConfig {
    /// Decay window in milliseconds: how fast historical imbalance between
    /// classes is forgiven.
    #[serde(default = "default_tau_ms")]
    pub tau_ms: u64,
    /// Maximum number of requests concurrently executing.
    #[serde(default = "default_unbounded")]
    pub max_req_count: u32,
    /// Maximum total bytes concurrently executing.
    #[serde(default = "default_unbounded")]
    pub max_bytes_count: u32,
}

impl Default for FairQueueConfig {
    fn default() -> Self {
        Self {
            tau_ms: default_tau_ms(),
            max_req_count: default_unbounded(),
            max_bytes_count: default_unbounded(),
        }
    }
}

impl FairQueueConfig {
    /// Construct a config with the given capacity, expressed in maximum
    /// concurrent requests and maximum concurrent bytes, and the default
    /// decay window.
    #[must_use]
    pub fn with_capacity(max_requests: u32, max_bytes: u32) -> Self {
        Self {
            max_req_count: max_requests,
            max_bytes_count: max_bytes,
            ..Self::default()
        }
    }

    /// The decay window as a [`Duration`].
    #[must_use]
    pub const fn tau(&self) -> Duration {
        Duration::from_millis(self.tau_ms)
    }

    /// Validate configuration values.
    ///
    /// A zero capacity on either dimension is rejected: the capacity ticket
    /// doubles as the normalization axis, which must be non-zero on both
    /// dimensions, and a zero-capacity queue could never dispatch anything.
    pub fn validate(&self) -> Result<(), String> {
        if self.tau_ms == 0 {
            return Err("tau_ms must be greater than 0".into());
        }
        if self.max_req_count == 0 {
            return Err("max_req_count must be greater than 0".into());
        }
        if self.max_bytes_count == 0 {
            return Err("max_bytes_count must be greater than 0".into());
        }
        Ok(())
    }
}

/// Root scheduler configuration: one fair queue per named resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Map of queue name to configuration.
    pub queues: HashMap<String, FairQueueConfig>,
}

impl SchedulerConfig {
    /// Validate all queues and ensure at least one queue exists.
    pub fn validate(&self) -> Result<(), String> {
        if self.queues.is_empty() {
            return Err("at least one queue must be defined".into());
        }
        for (name, queue) in &self.queues {
            queue
                .validate()
                .map_err(|e| format!("queue `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
