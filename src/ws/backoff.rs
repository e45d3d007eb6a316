//! Reconnect delay schedules

use std::time::Duration;

/// Default flat delay between reconnect attempts
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// How long to wait before each reconnect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Same delay before every attempt
    Fixed(Duration),
    /// Delay doubles after every failure, capped at `max`
    Exponential { initial: Duration, max: Duration },
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::Fixed(DEFAULT_RECONNECT_DELAY)
    }
}

/// Running backoff state for one connection loop
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    failures: u32,
    next: Duration,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            failures: 0,
            next: Self::initial(policy),
        }
    }

    fn initial(policy: BackoffPolicy) -> Duration {
        match policy {
            BackoffPolicy::Fixed(delay) => delay,
            BackoffPolicy::Exponential { initial, .. } => initial,
        }
    }

    /// Record a failure and return the delay before the next attempt
    pub fn next_delay(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let delay = self.next;
        if let BackoffPolicy::Exponential { max, .. } = self.policy {
            self.next = delay.saturating_mul(2).min(max);
        }
        delay
    }

    /// Consecutive failures since the last successful connection
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Forget past failures after a successful connection
    pub fn reset(&mut self) {
        self.failures = 0;
        self.next = Self::initial(self.policy);
    }
}
