//! Circuit breaker for the market-data provider.
//!
//! Three consecutive failures open the breaker; HTTP 403 or 418 (exchange
//! IP ban) opens it at once. While open, requests are refused without
//! touching the network until the cooldown expires, after which the breaker
//! closes with a fresh failure count.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Consecutive failures that open the breaker.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Requests allowed; `failures` consecutive failures so far.
    Closed { failures: u32 },
    /// Requests refused until `tripped_at + cooldown`.
    Open { tripped_at: Instant },
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration) -> Self {
        Self::with_threshold(cooldown, DEFAULT_FAILURE_THRESHOLD)
    }

    pub fn with_threshold(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            state: Mutex::new(BreakerState::Closed { failures: 0 }),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Provider default: 5-minute cooldown, opens after 3 consecutive failures.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }

    /// Whether a request may be sent now. Closes an open breaker whose
    /// cooldown has expired.
    pub fn is_allowed(&self) -> bool {
        let mut state = self.lock();
        match *state {
            BreakerState::Closed { .. } => true,
            BreakerState::Open { tripped_at } => {
                if tripped_at.elapsed() >= self.cooldown {
                    *state = BreakerState::Closed { failures: 0 };
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        *self.lock() = BreakerState::Closed { failures: 0 };
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        if let BreakerState::Closed { failures } = *state {
            let failures = failures + 1;
            *state = if failures >= self.failure_threshold {
                BreakerState::Open {
                    tripped_at: Instant::now(),
                }
            } else {
                BreakerState::Closed { failures }
            };
        }
    }

    /// Record a failed HTTP status. Ban statuses open the breaker immediately.
    pub fn record_status(&self, status: u16) {
        if matches!(status, 403 | 418) {
            self.trip();
        } else {
            self.record_failure();
        }
    }

    pub fn trip(&self) {
        *self.lock() = BreakerState::Open {
            tripped_at: Instant::now(),
        };
    }

    pub fn state(&self) -> BreakerState {
        *self.lock()
    }

    /// Remaining cooldown, zero when closed.
    pub fn remaining_cooldown(&self) -> Duration {
        match *self.lock() {
            BreakerState::Closed { .. } => Duration::ZERO,
            BreakerState::Open { tripped_at } => self.cooldown.saturating_sub(tripped_at.elapsed()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
