//! Bounded retry execution with exponential backoff.
//!
//! The [`Retrier`] runs a unit of work up to its policy's attempt bound,
//! invoking a caller-supplied failure observer on every failed attempt
//! and sleeping an exponentially growing delay between attempts. The
//! baseline policy retries *any* error without inspecting its kind; the
//! one hand-picked exclusion -- a streaming upload whose body cannot be
//! re-read -- is expressed in the policy itself rather than scattered
//! through call sites.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

/// Default attempt bound for general operations.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default base delay for general operations.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Calculate the delay before a retry attempt using exponential backoff.
///
/// The delay formula is: `base * 2^attempt`, saturating on overflow.
pub fn retry_delay(attempt: u32, base: Duration) -> Duration {
    let multiplier = 2_u32.saturating_pow(attempt);
    base.saturating_mul(multiplier)
}

/// What kind of remote operation an attempt belongs to.
///
/// Only `StreamingWrite` changes retry behavior; the other kinds exist
/// so policies and logs can tell attempts apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    SpaceRead,
    SpaceWrite,
    ContentRead,
    ContentWrite,
    /// A write whose request body is a single-pass stream. A failed
    /// attempt may already have consumed part of the body, so resending
    /// would transmit truncated or empty data.
    StreamingWrite,
    Task,
}

/// Decides whether a failed attempt is sent again.
pub trait RetryPolicy: Send + Sync {
    fn should_send_again(
        &self,
        attempt: u32,
        last_error: &(dyn StdError + 'static),
        op: OpKind,
    ) -> bool;
}

/// Retries every error up to `max_attempts`, without looking at the
/// error kind. Streaming writes are never sent again, regardless of the
/// attempt count.
#[derive(Debug, Clone)]
pub struct BlindRetryPolicy {
    pub max_attempts: u32,
}

impl Default for BlindRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy for BlindRetryPolicy {
    fn should_send_again(
        &self,
        attempt: u32,
        _last_error: &(dyn StdError + 'static),
        op: OpKind,
    ) -> bool {
        if op == OpKind::StreamingWrite {
            return false;
        }
        attempt + 1 < self.max_attempts
    }
}

/// Bounded, backed-off retry executor for a unit of work.
#[derive(Clone)]
pub struct Retrier {
    policy: Arc<dyn RetryPolicy>,
    base_delay: Duration,
}

impl Retrier {
    pub fn new(policy: Arc<dyn RetryPolicy>, base_delay: Duration) -> Self {
        Self { policy, base_delay }
    }

    /// Blind-retry policy with the given attempt bound.
    pub fn with_max_attempts(max_attempts: u32, base_delay: Duration) -> Self {
        Self::new(Arc::new(BlindRetryPolicy { max_attempts }), base_delay)
    }

    /// Run `attempt_fn` until it succeeds or the policy stops resending.
    ///
    /// `on_failure` is invoked for every failed attempt, including the
    /// final one. The last error is propagated unchanged.
    pub async fn execute<T, E, F, Fut, O>(
        &self,
        op: OpKind,
        mut attempt_fn: F,
        mut on_failure: O,
    ) -> Result<T, E>
    where
        E: StdError + 'static,
        F: FnMut(u32) -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        O: FnMut(&E),
    {
        let mut attempt = 0;
        loop {
            match attempt_fn(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    on_failure(&err);
                    if !self.policy.should_send_again(attempt, &err, op) {
                        return Err(err);
                    }
                }
            }
            tokio::time::sleep(retry_delay(attempt, self.base_delay)).await;
            attempt += 1;
        }
    }
}
