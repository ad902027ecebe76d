//! Retry policies
//!
//! Bounded attempts with linear backoff between them and an explicit
//! predicate deciding which failures are worth another attempt.

use socialdesk_core::InvocationError;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Which failures are retried.
///
/// Precondition failures (not configured, invalid URL or payload) are never
/// retried whatever the setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOn {
    /// Retry every failure, timeouts included
    AnyFailure,
    /// Return immediately on timeout, retry everything else
    NonTimeout,
}

impl RetryOn {
    pub fn should_retry(&self, error: &InvocationError) -> bool {
        if error.is_precondition() {
            return false;
        }
        match self {
            Self::AnyFailure => true,
            Self::NonTimeout => !error.is_timeout(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, the first one included (at least 1)
    pub max_attempts: u32,
    /// Delay after the first failed attempt; the n-th failure waits `n` times
    /// this
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1_000),
        }
    }
}

/// Bounded attempts with linear backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(mut config: RetryConfig) -> Self {
        config.max_attempts = config.max_attempts.max(1);
        Self { config }
    }

    /// `max_attempts` attempts with `base * n` between them
    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self::new(RetryConfig {
            max_attempts,
            base_delay,
        })
    }

    /// A single attempt
    pub fn no_retry() -> Self {
        Self::linear(1, Duration::ZERO)
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    /// Delay to wait after failed attempt `attempt` (1-indexed) before the
    /// next one: exactly `base * attempt`, saturating at `Duration::MAX`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.config.base_delay.saturating_mul(attempt)
    }
}

/// Run `operation` until it succeeds, `should_retry` rejects the error, or
/// the policy's attempts are used up. The operation receives the 1-indexed
/// attempt number. No delay follows the final attempt.
pub async fn retry_with<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= max_attempts || !should_retry(&error) {
                    return Err(error);
                }

                let delay = policy.delay_after(attempt);
                debug!(
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Waiting before retry"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
