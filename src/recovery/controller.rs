//! Recoverable-error state machine.
//!
//! # States
//! ```text
//! Idle → Error: a recoverable error was caught, retry scheduled
//! Error → Recovering: backoff timer fired, error state cleared
//! Recovering → Idle: caller re-runs the operation
//! any → ManualFailure: non-recoverable error, or retries exhausted
//! ManualFailure → Idle: user-initiated "try again"
//! ```
//!
//! # Design Decisions
//! - Pure state machine driven by an injected recoverability predicate and
//!   the configured backoff; no coupling to any UI component model
//! - Observable through a `tokio::sync::watch` channel
//! - The backoff timer is a cancellable task owned by the controller and
//!   aborted on any new action and on drop, so late callbacks never touch a
//!   torn-down controller
//! - `retry_count` persists across automatic cycles; only the manual
//!   "try again" action resets it

use crate::config::RecoveryConfig;
use crate::recovery::report::{ErrorReport, ErrorReporter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Observable controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryState {
    Idle,
    /// A recoverable error was caught; a retry is scheduled.
    Error { message: String, retry_count: u32 },
    /// The backoff elapsed; the error state is cleared and the operation
    /// should be re-run.
    Recovering { retry_count: u32 },
    /// Terminal until the user acts: non-recoverable error or retries spent.
    /// Carries the user-facing message.
    ManualFailure { message: String },
}

/// Decides whether an error (name, message) is worth retrying.
pub type RecoveryPredicate = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Invoked when a scheduled retry fires, with the new retry count.
pub type RetryHook = Arc<dyn Fn(u32) + Send + Sync>;

/// Default recoverability classification: transient infrastructure trouble
/// (network, timeout, 5xx, rate-limit/quota) is recoverable, everything else
/// is not.
pub fn default_recoverable(name: &str, message: &str) -> bool {
    let haystack = format!("{} {}", name, message).to_lowercase();
    const PATTERNS: &[&str] = &[
        "network",
        "timeout",
        "timed out",
        "fetch",
        "connection",
        "econn",
        "502",
        "503",
        "504",
        "bad gateway",
        "service unavailable",
        "internal server error",
        "rate limit",
        "rate-limit",
        "ratelimit",
        "quota",
        "429",
        "too many requests",
        "overloaded",
    ];
    PATTERNS.iter().any(|p| haystack.contains(p))
}

/// Map raw error text to a user-facing message.
pub fn friendly_message(raw: &str) -> &'static str {
    let lower = raw.to_lowercase();
    if lower.contains("api key")
        || lower.contains("api_key")
        || lower.contains("unauthorized")
        || lower.contains("401")
        || lower.contains("configuration")
    {
        "The AI service is not configured correctly. Please check the API key configuration."
    } else if lower.contains("rate limit")
        || lower.contains("rate-limit")
        || lower.contains("ratelimit")
        || lower.contains("quota")
        || lower.contains("429")
    {
        "The AI service is temporarily rate limited. Please wait a moment and try again."
    } else if lower.contains("network")
        || lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("fetch")
        || lower.contains("connection")
    {
        "A network problem interrupted the request. Check your connection and try again."
    } else if lower.contains("502")
        || lower.contains("503")
        || lower.contains("504")
        || lower.contains("500")
        || lower.contains("server error")
        || lower.contains("unavailable")
    {
        "The AI service is having trouble right now. Please try again shortly."
    } else {
        "Something went wrong. Please try again."
    }
}

struct ControllerInner {
    retry_count: u32,
    retry_task: Option<JoinHandle<()>>,
}

struct Shared {
    config: RecoveryConfig,
    is_recoverable: RecoveryPredicate,
    retry_hook: Option<RetryHook>,
    reporter: Option<ErrorReporter>,
    state_tx: watch::Sender<RecoveryState>,
    inner: Mutex<ControllerInner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// UI-facing recovery controller.
pub struct RecoveryController {
    shared: Arc<Shared>,
}

impl RecoveryController {
    pub fn new(config: RecoveryConfig) -> Self {
        Self::build(config, Arc::new(|n, m| default_recoverable(n, m)), None, None)
    }

    /// Replace the default recoverability predicate.
    pub fn with_predicate(config: RecoveryConfig, predicate: RecoveryPredicate) -> Self {
        Self::build(config, predicate, None, None)
    }

    fn build(
        config: RecoveryConfig,
        is_recoverable: RecoveryPredicate,
        retry_hook: Option<RetryHook>,
        reporter: Option<ErrorReporter>,
    ) -> Self {
        let (state_tx, _) = watch::channel(RecoveryState::Idle);
        Self {
            shared: Arc::new(Shared {
                config,
                is_recoverable,
                retry_hook,
                reporter,
                state_tx,
                inner: Mutex::new(ControllerInner {
                    retry_count: 0,
                    retry_task: None,
                }),
            }),
        }
    }

    /// Invoke `hook` whenever a scheduled retry fires.
    pub fn on_retry(mut self, hook: RetryHook) -> Self {
        let shared = Arc::get_mut(&mut self.shared)
            .expect("on_retry must be called before the controller is shared");
        shared.retry_hook = Some(hook);
        self
    }

    /// Attach a best-effort error reporter.
    pub fn with_reporter(mut self, reporter: ErrorReporter) -> Self {
        let shared = Arc::get_mut(&mut self.shared)
            .expect("with_reporter must be called before the controller is shared");
        shared.reporter = Some(reporter);
        self
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<RecoveryState> {
        self.shared.state_tx.subscribe()
    }

    pub fn state(&self) -> RecoveryState {
        self.shared.state_tx.borrow().clone()
    }

    pub fn retry_count(&self) -> u32 {
        self.shared.lock().retry_count
    }

    /// Feed a caught error into the state machine.
    ///
    /// Recoverable errors with remaining budget move to `Error` and schedule
    /// a retry after `min(base * 2^retry_count, cap)` ms. Everything else
    /// lands in `ManualFailure` with a user-facing message.
    pub fn on_error(&self, name: &str, message: &str) {
        let shared = &self.shared;
        let mut inner = shared.lock();

        if let Some(task) = inner.retry_task.take() {
            task.abort();
        }

        if let Some(reporter) = &shared.reporter {
            reporter.submit(ErrorReport::new(name, message, inner.retry_count));
        }

        let recoverable = shared.config.enabled && (shared.is_recoverable)(name, message);
        if !recoverable || inner.retry_count >= shared.config.max_retries {
            tracing::warn!(
                error_name = %name,
                retry_count = inner.retry_count,
                recoverable,
                "Recovery exhausted, manual action required"
            );
            shared.state_tx.send_replace(RecoveryState::ManualFailure {
                message: friendly_message(message).to_string(),
            });
            return;
        }

        let retry_count = inner.retry_count;
        shared.state_tx.send_replace(RecoveryState::Error {
            message: message.to_string(),
            retry_count,
        });

        let exponential = 2u64.saturating_pow(retry_count);
        let delay_ms = shared
            .config
            .base_delay_ms
            .saturating_mul(exponential)
            .min(shared.config.cap_ms);
        let delay = Duration::from_millis(delay_ms);
        tracing::info!(
            error_name = %name,
            retry_count,
            delay_ms,
            "Recoverable error caught, retry scheduled"
        );

        let task_shared = shared.clone();
        inner.retry_task = Some(tokio::spawn(async move {
            sleep(delay).await;

            let new_count = {
                let mut inner = task_shared.lock();
                inner.retry_count += 1;
                inner.retry_count
            };
            task_shared
                .state_tx
                .send_replace(RecoveryState::Recovering { retry_count: new_count });
            if let Some(hook) = &task_shared.retry_hook {
                hook(new_count);
            }
            task_shared.state_tx.send_replace(RecoveryState::Idle);
            tracing::debug!(retry_count = new_count, "Automatic recovery retry fired");
        }));
    }

    /// Manual "Try Again": clears the error and zeroes the retry budget.
    pub fn try_again(&self) {
        let mut inner = self.shared.lock();
        if let Some(task) = inner.retry_task.take() {
            task.abort();
        }
        inner.retry_count = 0;
        self.shared.state_tx.send_replace(RecoveryState::Idle);
        tracing::info!("Manual recovery triggered");
    }
}

impl Drop for RecoveryController {
    fn drop(&mut self) {
        if let Some(task) = self.shared.lock().retry_task.take() {
            task.abort();
        }
    }
}
