use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Consecutive failures tolerated before giving up; `0` retries forever.
    pub max_failures: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            max_failures: 50,
        }
    }
}

/// Doubling delay between failed reads, reset by any successful read.
#[derive(Debug)]
pub(in crate::ingest) struct Backoff {
    policy: RetryPolicy,
    failures: u32,
    delay: Duration,
}

impl Backoff {
    pub(in crate::ingest) fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            failures: 0,
            delay: policy.initial_backoff,
        }
    }

    /// Registers a failed read. Returns the delay to wait before retrying, or
    /// `None` once the consecutive-failure budget is spent.
    pub(in crate::ingest) fn on_failure(&mut self) -> Option<Duration> {
        self.failures = self.failures.saturating_add(1);
        if self.policy.max_failures != 0 && self.failures >= self.policy.max_failures {
            return None;
        }
        let current = self.delay.min(self.policy.max_backoff);
        self.delay = current.saturating_mul(2).min(self.policy.max_backoff);
        Some(current)
    }

    pub(in crate::ingest) fn on_success(&mut self) {
        self.failures = 0;
        self.delay = self.policy.initial_backoff;
    }

    pub(in crate::ingest) fn failures(&self) -> u32 {
        self.failures
    }
}
