//! Provider registry.
//!
//! # Responsibilities
//! - Own one breaker and one health tracker per provider
//! - Preserve the configured provider order for invocation and health reports
//!
//! # Design Decisions
//! - Built once at application start from validated config and passed by
//!   reference (Arc) to the invoker and health endpoints; tests construct
//!   fresh, isolated registries
//! - Breakers and trackers live for the process lifetime; `reset` on the
//!   aggregator is the only operation that force-clears them

use crate::config::GatewayConfig;
use crate::error::ProviderError;
use crate::health::tracker::HealthTracker;
use crate::observability::metrics;
use crate::provider::Provider;
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitState};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no implementation registered for configured provider '{0}'")]
    MissingImplementation(String),
}

/// A registered provider with its resilience state.
pub struct ProviderEntry {
    name: String,
    enabled: bool,
    provider: Arc<dyn Provider>,
    breaker: CircuitBreaker,
    tracker: HealthTracker,
}

impl ProviderEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn tracker(&self) -> &HealthTracker {
        &self.tracker
    }

    /// Whether this provider may serve traffic right now.
    pub fn available(&self) -> bool {
        self.enabled && self.breaker.state() != CircuitState::Open
    }

    /// Record a completed successful call into breaker, tracker, and metrics.
    pub fn record_success(&self, latency: Duration) {
        self.breaker.record_success();
        self.tracker.record_outcome(true, latency);
        metrics::record_provider_call(&self.name, "success", latency);
        metrics::record_breaker_state(&self.name, self.breaker.state());
    }

    /// Record a completed infrastructure failure into breaker, tracker, and
    /// metrics. Client errors must not be passed here.
    pub fn record_failure(&self, error: &ProviderError, latency: Duration) {
        debug_assert!(error.is_infrastructure());
        self.breaker.record_failure();
        self.tracker.record_outcome(false, latency);
        metrics::record_provider_call(&self.name, "failure", latency);
        metrics::record_breaker_state(&self.name, self.breaker.state());
        tracing::debug!(provider = %self.name, error = %error, "Recorded provider failure");
    }
}

/// Registry of providers in stable registration order.
pub struct ProviderRegistry {
    entries: Vec<Arc<ProviderEntry>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field(
                "entries",
                &self.entries.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ProviderRegistry {
    /// Build the registry from validated config and the matching provider
    /// implementations. Config order defines invocation priority.
    pub fn new(
        providers: Vec<Arc<dyn Provider>>,
        config: &GatewayConfig,
    ) -> Result<Self, RegistryError> {
        let mut entries = Vec::with_capacity(config.providers.len());

        for provider_config in &config.providers {
            let provider = providers
                .iter()
                .find(|p| p.name() == provider_config.name)
                .cloned()
                .ok_or_else(|| {
                    RegistryError::MissingImplementation(provider_config.name.clone())
                })?;

            entries.push(Arc::new(ProviderEntry {
                name: provider_config.name.clone(),
                enabled: provider_config.enabled,
                provider,
                breaker: CircuitBreaker::new(provider_config.name.clone(), config.breaker.clone()),
                tracker: HealthTracker::new(config.health.clone()),
            }));
        }

        for provider in &providers {
            if !entries.iter().any(|e| e.name == provider.name()) {
                tracing::warn!(provider = %provider.name(), "Provider implementation has no config entry, ignoring");
            }
        }

        Ok(Self { entries })
    }

    /// All entries in registration order.
    pub fn entries(&self) -> &[Arc<ProviderEntry>] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ProviderEntry>> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
