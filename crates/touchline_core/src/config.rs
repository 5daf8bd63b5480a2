//! Session-level configuration.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Retry policy for remote store writes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Backoff for the first retry; doubles per attempt, capped.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay_ms: 250 }
    }
}

/// Configuration for a live game session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Length of one half, in minutes (1..=90).
    pub half_duration_minutes: u32,
    /// Maximum goals recorded per side in one game.
    pub goal_capacity_per_side: usize,
    /// Suggested timer poll interval. Correctness never depends on it; it
    /// only bounds display latency.
    pub tick_interval_ms: u64,
    pub retry: RetryPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            half_duration_minutes: 30,
            goal_capacity_per_side: 20,
            tick_interval_ms: 100,
            retry: RetryPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.half_duration_minutes == 0 || self.half_duration_minutes > 90 {
            return Err(SessionError::InvalidHalfDuration {
                seconds: self.half_duration_minutes * 60,
            });
        }
        Ok(())
    }

    pub fn half_duration_seconds(&self) -> u32 {
        self.half_duration_minutes * 60
    }
}
