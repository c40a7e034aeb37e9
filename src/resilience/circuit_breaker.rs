//! Circuit breaker for provider protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: provider assumed down, calls fail fast
//! - Half-Open: testing if the provider recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= failure_threshold
//! Open → Half-Open: next allow() after cooldown_ms elapsed
//! Half-Open → Closed: success_threshold consecutive trial successes
//! Half-Open → Open: trial failure (cooldown clock restarts)
//! ```
//!
//! # Design Decisions
//! - Per-provider breaker (not global)
//! - Fail fast in Open state; the provider is never called
//! - Single trial in flight while Half-Open (prevents hammering a
//!   recovering provider); concurrent callers see `allow() == false`
//! - Every operation is one critical section on one mutex, safe under
//!   concurrent invocations against the same provider
//! - Clocks are `tokio::time::Instant` so tests can pause and advance time

use crate::config::BreakerConfig;
use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Breaker state, serialized with the wire names consumed by health clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    /// Consecutive counted failures. Only meaningful while Closed; zeroed on
    /// any transition into Closed.
    failure_count: u32,
    half_open_successes: u32,
    half_open_trial_in_flight: bool,
    /// When the in-flight trial was granted, for lease reclaim.
    trial_granted_at: Option<Instant>,
    last_failure_at: Option<Instant>,
    last_state_change_at: Instant,
}

/// Per-provider circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                half_open_successes: 0,
                half_open_trial_in_flight: false,
                trial_granted_at: None,
                last_failure_at: None,
                last_state_change_at: Instant::now(),
            }),
        }
    }

    /// Gate a call. Returns false when the call must not be made.
    ///
    /// The first `allow()` after the cooldown elapses moves an Open breaker
    /// to Half-Open and grants the single trial to that caller.
    pub fn allow(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if inner.last_state_change_at.elapsed() >= self.cooldown() {
                    inner.state = CircuitState::HalfOpen;
                    inner.half_open_successes = 0;
                    inner.half_open_trial_in_flight = true;
                    inner.trial_granted_at = Some(Instant::now());
                    inner.last_state_change_at = Instant::now();
                    tracing::info!(provider = %self.name, "Circuit breaker half-open, granting trial call");
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_trial_in_flight {
                    // A trial whose caller vanished without recording an
                    // outcome would wedge the breaker; reclaim the slot after
                    // a full cooldown period.
                    let stale = inner
                        .trial_granted_at
                        .map(|at| at.elapsed() >= self.cooldown())
                        .unwrap_or(true);
                    if !stale {
                        return false;
                    }
                    tracing::warn!(provider = %self.name, "Reclaiming abandoned half-open trial");
                }
                inner.half_open_trial_in_flight = true;
                inner.trial_granted_at = Some(Instant::now());
                true
            }
        }
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count = 0;
            }
            CircuitState::HalfOpen => {
                inner.half_open_trial_in_flight = false;
                inner.trial_granted_at = None;
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.half_open_successes = 0;
                    inner.last_state_change_at = Instant::now();
                    tracing::info!(provider = %self.name, "Circuit breaker closed after successful recovery");
                }
            }
            // Late completion of a call that started before the breaker
            // opened; the cooldown clock stays untouched.
            CircuitState::Open => {}
        }
    }

    /// Record a counted (infrastructure-level) failure.
    ///
    /// Callers must classify first: client errors never reach this method.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.last_failure_at = Some(Instant::now());
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.last_state_change_at = Instant::now();
                    tracing::warn!(
                        provider = %self.name,
                        failure_count = inner.failure_count,
                        threshold = self.config.failure_threshold,
                        "Circuit breaker opened due to failures"
                    );
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.half_open_trial_in_flight = false;
                inner.trial_granted_at = None;
                inner.half_open_successes = 0;
                inner.last_state_change_at = Instant::now();
                tracing::warn!(provider = %self.name, "Circuit breaker reopened after failed trial");
            }
            CircuitState::Open => {}
        }
    }

    /// Current state. Pure read: an Open breaker past its cooldown still
    /// reports Open until the next `allow()` performs the transition.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Force the breaker back to Closed with all counters zeroed.
    /// Used by the system-wide reset; idempotent.
    pub fn force_close(&self) {
        let mut inner = self.lock();
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.half_open_successes = 0;
        inner.half_open_trial_in_flight = false;
        inner.trial_granted_at = None;
        inner.last_state_change_at = Instant::now();
    }

    /// Consecutive counted failures (meaningful while Closed).
    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    fn cooldown(&self) -> Duration {
        Duration::from_millis(self.config.cooldown_ms)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        // Breaker state stays consistent even if a holder panicked mid-update;
        // every transition writes complete state.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
