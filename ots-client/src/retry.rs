//! Pluggable retry policies.
//!
//! A policy is two pure functions of (attempt count, classified error,
//! operation): whether to retry, and how long to wait. Only service-reported
//! errors participate; anything classified client-side is surfaced
//! immediately.
//!
//! Three implementations are provided: [`DefaultRetryPolicy`] (bounded
//! exponential backoff with half-jitter), [`NoRetryPolicy`], and
//! [`NoDelayRetryPolicy`]. Callers may substitute anything implementing
//! [`RetryPolicy`].

use std::time::Duration;

use ots_core::codes;

use crate::error::{Error, ServiceError};
use crate::request::Operation;

/// Decides whether and when to re-issue a failed operation.
pub trait RetryPolicy: Send + Sync {
    /// Whether attempt `attempts + 1` should be made for `error`.
    fn should_retry(&self, attempts: u32, error: &Error, operation: Operation) -> bool;

    /// How long to wait before the next attempt.
    fn retry_delay(&self, attempts: u32, error: &Error, operation: Operation) -> Duration;
}

/// Codes that are safe to retry regardless of the operation: the service
/// rejected the request before any effect took place.
fn retryable_for_any_operation(error: &ServiceError) -> bool {
    matches!(
        error.code.as_str(),
        codes::ROW_OPERATION_CONFLICT
            | codes::NOT_ENOUGH_CAPACITY_UNIT
            | codes::TABLE_NOT_READY
            | codes::PARTITION_UNAVAILABLE
            | codes::SERVER_BUSY
            | codes::OPERATION_THROTTLED
    ) || (error.code == codes::QUOTA_EXHAUSTED
        && error.message == codes::QUOTA_EXHAUSTED_TOO_FREQUENT)
}

/// Stability-class failures, retryable only when the operation itself is
/// repeatable (the request may have partially executed).
fn retryable_when_repeatable(error: &ServiceError) -> bool {
    matches!(
        error.code.as_str(),
        codes::TIMEOUT | codes::INTERNAL_SERVER_ERROR | codes::SERVER_UNAVAILABLE
    ) || matches!(error.http_status, 500 | 502 | 503)
}

fn is_server_throttling(error: &ServiceError) -> bool {
    matches!(
        error.code.as_str(),
        codes::SERVER_BUSY | codes::NOT_ENOUGH_CAPACITY_UNIT | codes::OPERATION_THROTTLED
    ) || (error.code == codes::QUOTA_EXHAUSTED
        && error.message == codes::QUOTA_EXHAUSTED_TOO_FREQUENT)
}

fn can_retry(error: &Error, operation: Operation) -> bool {
    let Some(service) = error.as_service() else {
        return false;
    };
    retryable_for_any_operation(service)
        || (operation.is_repeatable() && retryable_when_repeatable(service))
}

/// The default policy: up to 3 attempts, exponential backoff capped at 2
/// seconds, with the delay drawn uniformly from the upper half of the cap
/// (half-jitter: a guaranteed floor without synchronized retries).
#[derive(Clone, Debug)]
pub struct DefaultRetryPolicy {
    /// Maximum number of retry attempts.
    max_attempts: u32,
    /// Upper bound on any single delay.
    max_delay: Duration,
    /// Per-attempt growth of the delay cap.
    scale_factor: f64,
    /// Starting cap for server-throttling errors.
    throttling_delay_factor: f64,
    /// Starting cap for stability-class errors.
    stability_delay_factor: f64,
}

impl Default for DefaultRetryPolicy {
    fn default() -> Self {
        DefaultRetryPolicy {
            max_attempts: 3,
            max_delay: Duration::from_secs(2),
            scale_factor: 2.0,
            throttling_delay_factor: 0.5,
            stability_delay_factor: 0.2,
        }
    }
}

impl DefaultRetryPolicy {
    pub fn new() -> Self {
        DefaultRetryPolicy::default()
    }

    /// Set the maximum number of retry attempts.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the upper bound on a single retry delay.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    fn delay_cap(&self, attempts: u32, error: &Error) -> f64 {
        let factor = match error.as_service() {
            Some(service) if is_server_throttling(service) => self.throttling_delay_factor,
            _ => self.stability_delay_factor,
        };
        (factor * self.scale_factor.powi(attempts as i32)).min(self.max_delay.as_secs_f64())
    }
}

impl RetryPolicy for DefaultRetryPolicy {
    fn should_retry(&self, attempts: u32, error: &Error, operation: Operation) -> bool {
        if attempts >= self.max_attempts {
            return false;
        }
        can_retry(error, operation)
    }

    fn retry_delay(&self, attempts: u32, error: &Error, _operation: Operation) -> Duration {
        let cap = self.delay_cap(attempts, error);
        let delay = cap * 0.5 + cap * 0.5 * rand::random::<f64>();
        Duration::from_secs_f64(delay)
    }
}

/// Never retries.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRetryPolicy;

impl RetryPolicy for NoRetryPolicy {
    fn should_retry(&self, _attempts: u32, _error: &Error, _operation: Operation) -> bool {
        false
    }

    fn retry_delay(&self, _attempts: u32, _error: &Error, _operation: Operation) -> Duration {
        Duration::ZERO
    }
}

/// The default policy's decisions without any delay between attempts.
#[derive(Clone, Debug)]
pub struct NoDelayRetryPolicy {
    max_attempts: u32,
}

impl Default for NoDelayRetryPolicy {
    fn default() -> Self {
        NoDelayRetryPolicy { max_attempts: 3 }
    }
}

impl NoDelayRetryPolicy {
    pub fn new() -> Self {
        NoDelayRetryPolicy::default()
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

impl RetryPolicy for NoDelayRetryPolicy {
    fn should_retry(&self, attempts: u32, error: &Error, operation: Operation) -> bool {
        if attempts >= self.max_attempts {
            return false;
        }
        can_retry(error, operation)
    }

    fn retry_delay(&self, _attempts: u32, _error: &Error, _operation: Operation) -> Duration {
        Duration::ZERO
    }
}
