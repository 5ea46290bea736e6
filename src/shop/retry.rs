//! Retry policy for listing page fetches.
//!
//! The default is bounded retry with exponential backoff and a delay cap.
//! `RetryMode::Unbounded` reproduces the legacy behaviour of retrying the
//! same page forever with a fixed delay. It is a liveness hazard: a page that
//! never recovers stalls the run indefinitely. Only select it deliberately.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How page fetch failures are retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryMode {
    /// Give up after `max_attempts`, backing off between attempts.
    #[default]
    Bounded,
    /// Retry forever with a fixed `delay_ms` and no backoff growth.
    Unbounded,
}

impl std::str::FromStr for RetryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bounded" => Ok(RetryMode::Bounded),
            "unbounded" => Ok(RetryMode::Unbounded),
            _ => Err(format!("Unknown retry mode: {}. Use: bounded, unbounded", s)),
        }
    }
}

impl std::fmt::Display for RetryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryMode::Bounded => write!(f, "bounded"),
            RetryMode::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Retry settings, loaded from the `[retry]` config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub mode: RetryMode,
    /// Total attempts including the first (bounded mode only)
    pub max_attempts: u32,
    /// Delay before the first retry, and the fixed delay in unbounded mode
    pub delay_ms: u64,
    /// Multiplier applied to the delay after each failed retry
    pub backoff_factor: f64,
    /// Upper bound for any single delay
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            mode: RetryMode::Bounded,
            max_attempts: 5,
            delay_ms: 5000,
            backoff_factor: 2.0,
            max_delay_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// Bounded policy with a fixed delay (no growth).
    pub fn fixed(max_attempts: u32, delay_ms: u64) -> Self {
        Self { mode: RetryMode::Bounded, max_attempts, delay_ms, backoff_factor: 1.0, max_delay_ms: delay_ms }
    }

    /// The legacy retry-forever policy.
    pub fn unbounded(delay_ms: u64) -> Self {
        Self { mode: RetryMode::Unbounded, max_attempts: 0, delay_ms, backoff_factor: 1.0, max_delay_ms: delay_ms }
    }

    /// Returns the wait before the next attempt, given that `failed_attempts`
    /// attempts (>= 1) have failed so far, or `None` if the policy gives up.
    pub fn delay_after(&self, failed_attempts: u32) -> Option<Duration> {
        match self.mode {
            RetryMode::Unbounded => Some(Duration::from_millis(self.delay_ms)),
            RetryMode::Bounded => {
                if failed_attempts >= self.max_attempts.max(1) {
                    return None;
                }

                let exponent = failed_attempts.saturating_sub(1).min(i32::MAX as u32) as i32;
                let factor = self.backoff_factor.max(1.0).powi(exponent);
                let scaled = (self.delay_ms as f64 * factor).min(self.max_delay_ms as f64);
                let millis = if scaled.is_finite() { scaled.max(0.0) as u64 } else { self.max_delay_ms };

                Some(Duration::from_millis(millis))
            }
        }
    }

    /// Short human-readable summary for logs.
    pub fn describe(&self) -> String {
        match self.mode {
            RetryMode::Bounded => format!(
                "bounded: {} attempts, {}ms x{} up to {}ms",
                self.max_attempts, self.delay_ms, self.backoff_factor, self.max_delay_ms
            ),
            RetryMode::Unbounded => format!("unbounded: fixed {}ms, no attempt limit", self.delay_ms),
        }
    }
}
