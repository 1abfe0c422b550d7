//! Retry, backoff, and timeout budgets for single upstream calls.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors. [`with_deadline`] bounds one attempt so a stalled call is
//! abandoned at the budget boundary. Neither knows anything about tee times,
//! so both are tested here against fake operations.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// HTTP statuses that are retried after a backoff delay.
pub const RETRIABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Bounded retry schedule for one upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each following retry.
    pub backoff_base: Duration,
    /// Upper bound on a single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            max_retries,
            backoff_base,
            ..Self::default()
        }
    }

    /// No retries, no delay.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Base delay before retry number `attempt` (1-based), before jitter.
    fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.backoff_base
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Separate connect and read budgets for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallBudget {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for CallBudget {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            read: Duration::from_secs(8),
        }
    }
}

impl CallBudget {
    /// Wall-clock ceiling for a whole attempt.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.connect.saturating_add(self.read)
    }
}

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable: transport failures (connect, request, body), timeouts, and
/// [`RETRIABLE_STATUSES`]. Everything else (other statuses, payload and parse
/// errors, bad URLs) fails immediately.
pub fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Transport(e) => {
            e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
        }
        ScraperError::Timeout { .. } | ScraperError::RetriableStatus { .. } => true,
        ScraperError::UnexpectedStatus { .. }
        | ScraperError::Deserialize { .. }
        | ScraperError::UpstreamFormat { .. }
        | ScraperError::Parse { .. }
        | ScraperError::InvalidUrl { .. }
        | ScraperError::SourceUnavailable { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// With `max_retries = 2` the operation is attempted at most 3 times. The
/// wait before retry `n` is `backoff_base * 2^(n-1)`, capped at `max_delay`,
/// with ±25% jitter. Non-retriable errors are returned immediately.
///
/// # Errors
///
/// Returns the first non-retriable error, or the last error once retries are
/// exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = jitter(policy.base_delay(attempt));
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient upstream error, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Runs one attempt, failing with [`ScraperError::Timeout`] if it does not
/// finish within `budget`. The attempt's future is dropped at the deadline.
///
/// # Errors
///
/// Returns the attempt's own error, or `Timeout` when the budget is exceeded.
pub async fn with_deadline<T, Fut>(
    url: &str,
    budget: Duration,
    attempt: Fut,
) -> Result<T, ScraperError>
where
    Fut: Future<Output = Result<T, ScraperError>>,
{
    if let Ok(result) = tokio::time::timeout(budget, attempt).await {
        result
    } else {
        Err(ScraperError::Timeout {
            url: url.to_owned(),
            budget_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

fn jitter(delay: Duration) -> Duration {
    if delay.is_zero() {
        return delay;
    }
    delay.mul_f64(rand::random::<f64>() * 0.5 + 0.75)
}
