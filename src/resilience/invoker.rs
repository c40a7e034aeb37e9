//! Multi-provider failover invoker.
//!
//! # Data Flow
//! ```text
//! invoke(request)
//!     → for each provider in priority order:
//!         breaker.allow()?          → no: skip provider (not a failure)
//!         call under per-call timeout
//!         → success: record, return with provider_used
//!         → infrastructure failure: record, backoff + retry same provider
//!           until its retry budget is spent, then fail over
//!         → client error: stop immediately, surface to caller
//!     → all providers spent: AllProvidersUnavailable
//! ```
//!
//! # Design Decisions
//! - A provider whose breaker denies `allow()` is never called, regardless
//!   of remaining retry budget; the gate is re-checked before every attempt
//! - Backoff waits are plain `tokio::time::sleep`s, so dropping the
//!   invocation future cancels them; breaker and tracker state is only
//!   mutated by attempts that ran to completion
//! - Every invocation carries a UUID through its tracing span

use crate::config::RetryConfig;
use crate::error::{InvokeError, ProviderError};
use crate::observability::metrics;
use crate::provider::{ProviderRegistry, ProviderRequest, ProviderResponse};
use crate::resilience::backoff::retry_delay;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use uuid::Uuid;

/// Outcome of a successful invocation.
#[derive(Debug)]
pub struct InvocationResult {
    pub payload: ProviderResponse,
    /// Name of the provider that produced the response.
    pub provider_used: String,
    /// Total attempts made across all providers, including the final success.
    pub attempts: u32,
    pub total_latency_ms: u64,
}

/// Orchestrates one logical request across the provider list.
pub struct ResilientInvoker {
    registry: Arc<ProviderRegistry>,
    retry: RetryConfig,
}

impl ResilientInvoker {
    pub fn new(registry: Arc<ProviderRegistry>, retry: RetryConfig) -> Self {
        Self { registry, retry }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Invoke using the registry's configured provider order.
    pub async fn invoke(&self, request: ProviderRequest) -> Result<InvocationResult, InvokeError> {
        let order: Vec<String> = self
            .registry
            .entries()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        self.invoke_ordered(request, &order).await
    }

    /// Invoke against an explicit provider order.
    pub async fn invoke_ordered(
        &self,
        request: ProviderRequest,
        order: &[String],
    ) -> Result<InvocationResult, InvokeError> {
        let invocation_id = Uuid::new_v4();
        let span = tracing::info_span!("invoke", %invocation_id);
        let _guard = span.enter();

        let started = Instant::now();
        let mut attempts: u32 = 0;
        let mut last_error: Option<ProviderError> = None;

        for name in order {
            let Some(entry) = self.registry.get(name) else {
                tracing::warn!(provider = %name, "Unknown provider in invocation order, skipping");
                continue;
            };
            if !entry.is_enabled() {
                tracing::debug!(provider = %name, "Provider disabled, skipping");
                continue;
            }

            let mut provider_attempt: u32 = 0;
            loop {
                // Re-checked before every attempt: a breaker that opened
                // mid-retry stops the remaining budget.
                if !entry.breaker().allow() {
                    tracing::debug!(provider = %name, "Circuit open, skipping provider");
                    metrics::record_breaker_rejection(name);
                    break;
                }

                attempts += 1;
                let call_started = Instant::now();
                let call_timeout = Duration::from_millis(self.retry.call_timeout_ms);
                let outcome = timeout(call_timeout, entry.provider().call(request.clone())).await;
                let latency = call_started.elapsed();

                let error = match outcome {
                    Ok(Ok(response)) => {
                        entry.record_success(latency);
                        let total_latency_ms = started.elapsed().as_millis() as u64;
                        metrics::record_invocation("success", attempts, started.elapsed());
                        tracing::info!(
                            provider = %name,
                            attempts,
                            total_latency_ms,
                            "Invocation succeeded"
                        );
                        return Ok(InvocationResult {
                            payload: response,
                            provider_used: name.clone(),
                            attempts,
                            total_latency_ms,
                        });
                    }
                    Ok(Err(error)) => error,
                    Err(_) => ProviderError::Timeout,
                };

                if !error.is_infrastructure() {
                    // Client error: retrying or failing over would reproduce
                    // it. Not recorded against the breaker.
                    metrics::record_invocation("rejected", attempts, started.elapsed());
                    tracing::warn!(provider = %name, error = %error, "Request rejected by provider");
                    return Err(InvokeError::Rejected {
                        provider: name.clone(),
                        source: error,
                    });
                }

                entry.record_failure(&error, latency);

                if provider_attempt < self.retry.max_retries {
                    let delay = retry_delay(provider_attempt, &self.retry);
                    tracing::warn!(
                        provider = %name,
                        attempt = provider_attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Provider attempt failed, retrying"
                    );
                    last_error = Some(error);
                    provider_attempt += 1;
                    sleep(delay).await;
                } else {
                    tracing::warn!(
                        provider = %name,
                        error = %error,
                        "Provider retry budget exhausted, failing over"
                    );
                    last_error = Some(error);
                    break;
                }
            }
        }

        metrics::record_invocation("exhausted", attempts, started.elapsed());
        tracing::error!(attempts, "All providers unavailable");
        Err(InvokeError::AllProvidersUnavailable {
            attempts,
            last_error: last_error.map(|e| e.to_string()),
        })
    }

    /// Call one specific provider under its breaker, without failover.
    ///
    /// Returns [`InvokeError::CircuitOpen`] when the breaker denies the call.
    pub async fn call_provider(
        &self,
        name: &str,
        request: ProviderRequest,
    ) -> Result<InvocationResult, InvokeError> {
        let entry = self
            .registry
            .get(name)
            .ok_or_else(|| InvokeError::UnknownProvider(name.to_string()))?;

        if !entry.is_enabled() || !entry.breaker().allow() {
            metrics::record_breaker_rejection(name);
            return Err(InvokeError::CircuitOpen(name.to_string()));
        }

        let started = Instant::now();
        let call_timeout = Duration::from_millis(self.retry.call_timeout_ms);
        let outcome = timeout(call_timeout, entry.provider().call(request)).await;
        let latency = started.elapsed();

        let error = match outcome {
            Ok(Ok(response)) => {
                entry.record_success(latency);
                return Ok(InvocationResult {
                    payload: response,
                    provider_used: name.to_string(),
                    attempts: 1,
                    total_latency_ms: latency.as_millis() as u64,
                });
            }
            Ok(Err(error)) => error,
            Err(_) => ProviderError::Timeout,
        };

        if error.is_infrastructure() {
            entry.record_failure(&error, latency);
            Err(InvokeError::AllProvidersUnavailable {
                attempts: 1,
                last_error: Some(error.to_string()),
            })
        } else {
            Err(InvokeError::Rejected {
                provider: name.to_string(),
                source: error,
            })
        }
    }
}
