//! Retry policy: bounded retry loop with exponential backoff and jitter.
//!
//! The loop is an explicit state machine rather than recursion, so attempt
//! and delay bookkeeping stay inspectable and the call stack stays flat even
//! under pathological configurations.
//!
//! Backoff formula: `min(max_delay, min_delay * 2^(n-1) + jitter)` after the
//! n-th failed attempt, with jitter drawn uniformly from
//! `[0, min_delay * 2^(n-1))`. Additive jitter keeps the delay envelope
//! non-decreasing across attempts while still desynchronizing concurrent
//! callers.
//!
//! The policy has no knowledge of request side-effect safety: it assumes
//! every wrapped call is safe to repeat, which holds for the read-oriented
//! geospatial operations this server issues.

use crate::error::{TransportError, TransportFailure};
use crate::model::{Request, Response};
use crate::policy::Next;
use rand::Rng;
use std::time::Duration;

/// Retry configuration, read once at pipeline construction.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the initial one.
    pub max_attempts: u32,
    /// Backoff floor (delay before the first retry).
    pub min_delay: Duration,
    /// Backoff ceiling.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_millis(200),
            max_delay: Duration::from_millis(2000),
        }
    }
}

/// Outcome observed on the last attempt, kept so exhaustion surfaces the real
/// terminal cause rather than a synthetic one.
enum Outcome {
    Response(Response),
    Failure(TransportFailure),
}

enum RetryState {
    Attempting { attempt: u32 },
    AwaitingRetryDelay { next_attempt: u32, delay: Duration },
    Succeeded(Response),
    Exhausted(Outcome),
}

pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub(crate) async fn apply(
        &self,
        request: Request,
        next: Next<'_>,
    ) -> Result<Response, TransportError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut state = RetryState::Attempting { attempt: 1 };

        loop {
            state = match state {
                RetryState::Attempting { attempt } => {
                    // Each attempt gets an independent clone so attempt-scoped
                    // instrumentation never leaks into the original request.
                    let mut attempt_request = request.clone();
                    attempt_request.context.attempt = attempt;

                    match next.run(attempt_request).await {
                        Ok(response) if !is_retryable_status(response.status) => {
                            RetryState::Succeeded(response)
                        }
                        Ok(response) => {
                            tracing::debug!(
                                status = response.status,
                                attempt,
                                max_attempts,
                                "retryable response status"
                            );
                            self.after_failure(attempt, max_attempts, Outcome::Response(response))
                        }
                        Err(TransportError::Transport { failure, .. }) => {
                            tracing::debug!(
                                kind = %failure.kind,
                                attempt,
                                max_attempts,
                                "transient transport failure"
                            );
                            self.after_failure(attempt, max_attempts, Outcome::Failure(failure))
                        }
                        // An inner policy already reported exhaustion; do not
                        // multiply retries.
                        Err(other) => return Err(other),
                    }
                }
                RetryState::AwaitingRetryDelay {
                    next_attempt,
                    delay,
                } => {
                    tokio::time::sleep(delay).await;
                    RetryState::Attempting {
                        attempt: next_attempt,
                    }
                }
                RetryState::Succeeded(response) => return Ok(response),
                RetryState::Exhausted(Outcome::Response(response)) => {
                    return Err(TransportError::Exhausted {
                        attempts: max_attempts,
                        response,
                    });
                }
                RetryState::Exhausted(Outcome::Failure(failure)) => {
                    return Err(TransportError::Transport {
                        attempts: max_attempts,
                        failure,
                    });
                }
            };
        }
    }

    fn after_failure(&self, attempt: u32, max_attempts: u32, outcome: Outcome) -> RetryState {
        if attempt >= max_attempts {
            RetryState::Exhausted(outcome)
        } else {
            RetryState::AwaitingRetryDelay {
                next_attempt: attempt + 1,
                delay: backoff_delay(&self.config, attempt),
            }
        }
    }
}

/// A failure is retryable when retrying can plausibly fix it: server errors
/// and rate limiting. Other client errors indicate a malformed request.
#[must_use]
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

/// Delay before the retry that follows failed attempt `attempt` (1-based).
pub(crate) fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let base = config.min_delay.as_millis() as u64;
    let ceiling = config.max_delay.as_millis() as u64;
    // Shift capped so the multiplier cannot overflow before clamping.
    let exp = base.saturating_mul(1u64 << attempt.saturating_sub(1).min(16));
    let jitter = if exp == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..exp)
    };
    Duration::from_millis(exp.saturating_add(jitter).min(ceiling).max(base))
}
