//! Reconnect backoff strategies
//!
//! Injected into the feed listener so tests can simulate failure runs
//! without real delays.

use crate::config::FeedConfig;
use rand::Rng;
use std::time::Duration;
use tracing::warn;

/// Delay policy between reconnect attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Constant delay after every failure
    Fixed { delay: Duration },
    /// Doubles per consecutive failure, capped
    Exponential { base: Duration, cap: Duration },
    /// Exponential with uniform jitter in [delay/2, delay]
    Jittered { base: Duration, cap: Duration },
}

impl BackoffPolicy {
    pub fn from_config(cfg: &FeedConfig) -> Self {
        let base = Duration::from_secs(cfg.reconnect_delay_secs);
        let cap = Duration::from_secs(cfg.max_delay_secs);

        match cfg.backoff.as_str() {
            "fixed" => BackoffPolicy::Fixed { delay: base },
            "exponential" => BackoffPolicy::Exponential { base, cap },
            "jittered" => BackoffPolicy::Jittered { base, cap },
            other => {
                warn!(strategy = other, "unknown backoff strategy, using fixed");
                BackoffPolicy::Fixed { delay: base }
            }
        }
    }

    /// Delay before the next attempt, given the number of consecutive
    /// failures so far (0 = first failure).
    pub fn delay(&self, failures: u32) -> Duration {
        match *self {
            BackoffPolicy::Fixed { delay } => delay,
            BackoffPolicy::Exponential { base, cap } => exponential(base, cap, failures),
            BackoffPolicy::Jittered { base, cap } => {
                let full = exponential(base, cap, failures);
                let factor: f64 = rand::rng().random_range(0.5..=1.0);
                full.mul_f64(factor)
            }
        }
    }
}

fn exponential(base: Duration, cap: Duration, failures: u32) -> Duration {
    // 2^failures, saturating well before Duration overflow
    let factor = 1u64 << failures.min(20);
    (base * factor as u32).min(cap)
}
