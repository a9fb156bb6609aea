//! Busy-retry policies.
//!
//! The solver has no way to signal completion; it answers with the busy
//! sentinel until the reply is ready. A policy decides how long to sleep
//! between polls and how long to keep polling at all.

use rand::Rng;
use std::{fmt, time::Duration};

/// How the transport waits out busy replies.
pub trait RetryPolicy: fmt::Debug + Send + Sync {
    /// Sleep before the next poll. `attempt` starts at 1 for the first busy reply.
    fn delay(&self, attempt: u32) -> Duration;

    /// Total time to keep polling before giving up. `None` polls forever.
    fn max_wait(&self) -> Option<Duration>;
}

/// Polls at a fixed interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedInterval {
    pub interval: Duration,
    pub max_wait: Option<Duration>,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_wait: None,
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }
}

impl Default for FixedInterval {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl RetryPolicy for FixedInterval {
    fn delay(&self, _attempt: u32) -> Duration {
        self.interval
    }

    fn max_wait(&self) -> Option<Duration> {
        self.max_wait
    }
}

/// Grows the interval geometrically up to a cap, optionally with jitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExponentialBackoff {
    pub initial: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    /// Picks each delay uniformly from `[delay / 2, delay]`.
    pub jitter: bool,
    pub max_wait: Option<Duration>,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(50),
            max_interval: Duration::from_secs(2),
            multiplier: 2.0,
            jitter: false,
            max_wait: None,
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        if self.initial.is_zero() {
            return Duration::ZERO;
        }
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let scaled = self.initial.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        let capped = scaled.min(self.max_interval.as_secs_f64());
        let delay = Duration::try_from_secs_f64(capped).unwrap_or(self.max_interval);
        if self.jitter && !delay.is_zero() {
            rand::rng().random_range(delay / 2..=delay)
        } else {
            delay
        }
    }

    fn max_wait(&self) -> Option<Duration> {
        self.max_wait
    }
}
