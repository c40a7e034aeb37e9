//! Invoker failures driving the client-side recovery loop and stall
//! detection.

mod common;

use ai_gateway::error::ProviderError;
use ai_gateway::recovery::{LoadingState, RecoveryController, RecoveryState, StallDetector};
use ai_gateway::resilience::ResilientInvoker;
use ai_gateway::config::RecoveryConfig;
use common::{registry, request, test_config, Outcome, ScriptedProvider};
use std::sync::Arc;
use std::time::Duration;

fn recovery_config(max_retries: u32) -> RecoveryConfig {
    RecoveryConfig {
        enabled: true,
        max_retries,
        base_delay_ms: 1_000,
        cap_ms: 10_000,
        stall_timeout_ms: 30_000,
    }
}

#[tokio::test(start_paused = true)]
async fn exhausted_invocation_is_classified_recoverable() {
    let a = ScriptedProvider::always_failing("a", ProviderError::Network("connection refused".into()));
    let config = test_config(&["a"]);
    let invoker = ResilientInvoker::new(registry(&[a], &config), config.retry);

    let err = invoker.invoke(request()).await.unwrap_err();

    // The exhaustion message carries the underlying provider failure, so the
    // default predicate recognizes it as transient.
    let ctl = RecoveryController::new(recovery_config(3));
    let mut rx = ctl.subscribe();
    ctl.on_error("InvokeError", &err.to_string());
    assert!(matches!(ctl.state(), RecoveryState::Error { retry_count: 0, .. }));

    rx.wait_for(|s| matches!(s, RecoveryState::Idle)).await.unwrap();
    assert_eq!(ctl.retry_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn persistent_outage_ends_in_manual_failure() {
    let a = ScriptedProvider::always_failing("a", ProviderError::Network("connection refused".into()));
    let mut config = test_config(&["a"]);
    // Keep the breaker closed so every cycle surfaces the same network error.
    config.breaker.failure_threshold = 100;
    let invoker = ResilientInvoker::new(registry(&[a], &config), config.retry);

    let ctl = RecoveryController::new(recovery_config(2));
    let mut rx = ctl.subscribe();

    // Budget of 2: two automatic retries, then the third error is terminal.
    for _ in 0..2 {
        let err = invoker.invoke(request()).await.unwrap_err();
        ctl.on_error("InvokeError", &err.to_string());
        rx.wait_for(|s| matches!(s, RecoveryState::Idle)).await.unwrap();
    }
    let err = invoker.invoke(request()).await.unwrap_err();
    ctl.on_error("InvokeError", &err.to_string());

    match ctl.state() {
        RecoveryState::ManualFailure { message } => {
            assert!(message.contains("network problem"));
        }
        other => panic!("expected ManualFailure, got {other:?}"),
    }

    // "Try Again" restores the full budget.
    ctl.try_again();
    assert_eq!(ctl.state(), RecoveryState::Idle);
    assert_eq!(ctl.retry_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn client_rejection_is_not_retried_by_recovery() {
    let a = ScriptedProvider::always_failing("a", ProviderError::InvalidRequest("missing destination".into()));
    let config = test_config(&["a"]);
    let invoker = ResilientInvoker::new(registry(&[a], &config), config.retry);

    let err = invoker.invoke(request()).await.unwrap_err();
    let ctl = RecoveryController::new(recovery_config(3));
    ctl.on_error("InvokeError", &err.to_string());
    assert!(matches!(ctl.state(), RecoveryState::ManualFailure { .. }));
}

#[tokio::test(start_paused = true)]
async fn stall_detector_fires_while_invocation_is_still_pending() {
    let a = ScriptedProvider::new("a", Vec::new(), Outcome::Hang);
    let mut config = test_config(&["a"]);
    config.retry.max_retries = 0;
    config.retry.call_timeout_ms = 60_000;
    let invoker = Arc::new(ResilientInvoker::new(registry(&[a], &config), config.retry));

    let detector = StallDetector::new(Duration::from_millis(1_000), || {});
    let mut rx = detector.subscribe();

    detector.loading_started();
    let task = tokio::spawn({
        let invoker = invoker.clone();
        async move { invoker.invoke(request()).await }
    });

    // The stall threshold fires long before the per-call timeout does.
    rx.wait_for(|s| *s == LoadingState::Stalled).await.unwrap();
    assert!(!task.is_finished());
    assert!(detector.elapsed().unwrap() >= Duration::from_millis(1_000));

    // The operation itself keeps running until its own timeout.
    let err = task.await.unwrap().unwrap_err();
    assert!(err.to_string().contains("timed out"));

    detector.loading_finished();
    assert_eq!(detector.state(), LoadingState::Idle);
}
