//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ai_gateway_provider_calls_total` (counter): completed attempts by provider, outcome
//! - `ai_gateway_provider_call_duration_seconds` (histogram): per-attempt latency
//! - `ai_gateway_breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//! - `ai_gateway_breaker_rejections_total` (counter): fast-failed calls
//! - `ai_gateway_invocations_total` (counter): logical invocations by outcome
//! - `ai_gateway_invocation_duration_seconds` (histogram): end-to-end latency
//!
//! # Design Decisions
//! - Low-overhead updates; labels only on provider and outcome
//! - Exposition via the Prometheus exporter, enabled by config

use crate::resilience::circuit_breaker::CircuitState;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus recorder and scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics endpoint started");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to start metrics endpoint");
        }
    }
}

/// Record one completed provider attempt.
pub fn record_provider_call(provider: &str, outcome: &str, latency: Duration) {
    counter!(
        "ai_gateway_provider_calls_total",
        "provider" => provider.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
    histogram!(
        "ai_gateway_provider_call_duration_seconds",
        "provider" => provider.to_string(),
    )
    .record(latency.as_secs_f64());
}

/// Record the current breaker state for a provider.
pub fn record_breaker_state(provider: &str, state: CircuitState) {
    let value = match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    };
    gauge!(
        "ai_gateway_breaker_state",
        "provider" => provider.to_string(),
    )
    .set(value);
}

/// Record a call that was fast-failed by an open breaker.
pub fn record_breaker_rejection(provider: &str) {
    counter!(
        "ai_gateway_breaker_rejections_total",
        "provider" => provider.to_string(),
    )
    .increment(1);
}

/// Record one logical invocation end-to-end.
pub fn record_invocation(outcome: &str, attempts: u32, total: Duration) {
    counter!(
        "ai_gateway_invocations_total",
        "outcome" => outcome.to_string(),
    )
    .increment(1);
    counter!("ai_gateway_invocation_attempts_total").increment(attempts as u64);
    histogram!(
        "ai_gateway_invocation_duration_seconds",
        "outcome" => outcome.to_string(),
    )
    .record(total.as_secs_f64());
}
