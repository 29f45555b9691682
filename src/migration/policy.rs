//! Pacing and retry parameters

use std::time::Duration;

/// Fixed-count, fixed-delay retry plus the pause between catalog entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total pull attempts, including the first
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub pacing_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            pacing_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// No sleeping at all; used where the delays would only slow things down
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            retry_delay: Duration::ZERO,
            pacing_delay: Duration::ZERO,
        }
    }
}
