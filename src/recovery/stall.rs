//! Stall detection for long-running operations.
//!
//! # Responsibilities
//! - Watch a loading operation and flip its rendered state to "stalled" when
//!   it outlives the configured threshold
//! - Fire a one-time advisory callback; the underlying operation is never
//!   cancelled here
//!
//! # Design Decisions
//! - One-shot timer per operation; an epoch counter discards timers from
//!   superseded operations so a late callback can never touch fresh state
//! - Timers are aborted on completion and on drop

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

/// Observable loading state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    Idle,
    InProgress,
    /// Still loading past the stall threshold. Advisory: the operation keeps
    /// running.
    Stalled,
}

struct StallInner {
    epoch: u64,
    started_at: Option<Instant>,
    timer: Option<JoinHandle<()>>,
}

struct Shared {
    timeout: Duration,
    on_timeout: Arc<dyn Fn() + Send + Sync>,
    state_tx: watch::Sender<LoadingState>,
    inner: Mutex<StallInner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, StallInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Detects when an async operation has been loading for too long.
pub struct StallDetector {
    shared: Arc<Shared>,
}

impl StallDetector {
    pub fn new(timeout: Duration, on_timeout: impl Fn() + Send + Sync + 'static) -> Self {
        let (state_tx, _) = watch::channel(LoadingState::Idle);
        Self {
            shared: Arc::new(Shared {
                timeout,
                on_timeout: Arc::new(on_timeout),
                state_tx,
                inner: Mutex::new(StallInner {
                    epoch: 0,
                    started_at: None,
                    timer: None,
                }),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadingState> {
        self.shared.state_tx.subscribe()
    }

    pub fn state(&self) -> LoadingState {
        *self.shared.state_tx.borrow()
    }

    /// How long the current operation has been running.
    pub fn elapsed(&self) -> Option<Duration> {
        self.shared.lock().started_at.map(|at| at.elapsed())
    }

    /// Arm the stall timer for a new operation.
    pub fn loading_started(&self) {
        let mut inner = self.shared.lock();
        inner.epoch += 1;
        let epoch = inner.epoch;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        inner.started_at = Some(Instant::now());
        self.shared.state_tx.send_replace(LoadingState::InProgress);

        let shared = self.shared.clone();
        inner.timer = Some(tokio::spawn(async move {
            sleep(shared.timeout).await;

            let fire = {
                let inner = shared.lock();
                inner.epoch == epoch && inner.started_at.is_some()
            };
            if fire {
                shared.state_tx.send_replace(LoadingState::Stalled);
                tracing::warn!(
                    timeout_ms = shared.timeout.as_millis() as u64,
                    "Operation stalled past threshold"
                );
                (shared.on_timeout)();
            }
        }));
    }

    /// The operation completed (successfully or not); disarm everything.
    pub fn loading_finished(&self) {
        let mut inner = self.shared.lock();
        inner.epoch += 1;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        inner.started_at = None;
        self.shared.state_tx.send_replace(LoadingState::Idle);
    }
}

impl Drop for StallDetector {
    fn drop(&mut self) {
        if let Some(timer) = self.shared.lock().timer.take() {
            timer.abort();
        }
    }
}
