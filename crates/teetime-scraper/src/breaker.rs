//! Consecutive-failure circuit breaker for an unreliable upstream.
//!
//! There is no half-open trial state: once the cool-down has elapsed the next
//! call is simply attempted, and its outcome updates the counters. A failure
//! after cool-down therefore re-opens the circuit straight away, because the
//! failure count was never reset.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub cool_down: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cool_down: Duration::from_secs(300),
        }
    }
}

/// Point-in-time view of the breaker, for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakerStatus {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    /// Seconds until calls are attempted again; `0` when closed.
    pub reopens_in_secs: u64,
}

#[derive(Debug, Default)]
struct BreakerInner {
    consecutive_failures: u32,
    open_until: Option<Instant>,
}

/// Thread-safe circuit breaker. The lock is only held for counter updates,
/// never across an upstream call.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        // Counters stay meaningful even if a holder panicked mid-update.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `false` while the circuit is open and the cool-down has not elapsed.
    pub fn allow_request(&self) -> bool {
        let inner = self.lock();
        inner
            .open_until
            .is_none_or(|until| Instant::now() >= until)
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures = 0;
        inner.open_until = None;
    }

    /// Counts a failure and opens the circuit once the threshold is reached.
    ///
    /// Returns `true` if this failure (re)opened the circuit.
    pub fn record_failure(&self) -> bool {
        let mut inner = self.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        if inner.consecutive_failures >= self.config.failure_threshold {
            inner.open_until = Some(Instant::now() + self.config.cool_down);
            true
        } else {
            false
        }
    }

    pub fn state(&self) -> CircuitState {
        self.status().state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    pub fn status(&self) -> BreakerStatus {
        let inner = self.lock();
        let now = Instant::now();
        match inner.open_until {
            Some(until) if now < until => BreakerStatus {
                state: CircuitState::Open,
                consecutive_failures: inner.consecutive_failures,
                reopens_in_secs: until.duration_since(now).as_secs(),
            },
            _ => BreakerStatus {
                state: CircuitState::Closed,
                consecutive_failures: inner.consecutive_failures,
                reopens_in_secs: 0,
            },
        }
    }
}
