//! System-wide health aggregation.
//!
//! # Responsibilities
//! - Snapshot every provider's breaker + window into one report
//! - Derive the overall status
//! - Force-reset all resilience state on operator request
//!
//! # Design Decisions
//! - `status` is a pure function of per-provider state: healthy iff every
//!   provider is Closed and available, critical iff every provider is Open
//!   or unavailable, degraded otherwise
//! - An empty registry reports critical (nothing can serve)
//! - Reports preserve registration order; JSON field names match the shapes
//!   consumed by the monitoring widget

use crate::provider::ProviderRegistry;
use crate::resilience::circuit_breaker::CircuitState;
use serde::Serialize;
use std::sync::Arc;

/// Overall system status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    Healthy,
    Degraded,
    Critical,
}

/// Health snapshot for a single provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderHealth {
    pub name: String,
    pub circuit_state: CircuitState,
    pub available: bool,
    /// Rolling-window success rate, 0-100.
    pub success_rate: f64,
    pub error_count: u64,
    /// Window-average latency in milliseconds.
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
}

/// Aggregated health report across all providers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub status: SystemStatus,
    pub healthy_providers: usize,
    pub total_providers: usize,
    pub providers_health: Vec<ProviderHealth>,
}

/// Combines breaker and tracker snapshots; also the reset hook.
pub struct SystemHealthAggregator {
    registry: Arc<ProviderRegistry>,
}

impl SystemHealthAggregator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Snapshot every registered provider, in registration order.
    pub fn system_health(&self) -> SystemHealth {
        let providers_health: Vec<ProviderHealth> = self
            .registry
            .entries()
            .iter()
            .map(|entry| {
                let stats = entry.tracker().stats();
                ProviderHealth {
                    name: entry.name().to_string(),
                    circuit_state: entry.breaker().state(),
                    available: entry.available(),
                    success_rate: stats.success_rate,
                    error_count: stats.error_count,
                    response_time_ms: stats.response_time_ms,
                }
            })
            .collect();

        let total_providers = providers_health.len();
        let healthy_providers = providers_health
            .iter()
            .filter(|p| p.circuit_state == CircuitState::Closed && p.available)
            .count();

        let status = if total_providers == 0 {
            SystemStatus::Critical
        } else if healthy_providers == total_providers {
            SystemStatus::Healthy
        } else if providers_health
            .iter()
            .all(|p| p.circuit_state == CircuitState::Open || !p.available)
        {
            SystemStatus::Critical
        } else {
            SystemStatus::Degraded
        };

        SystemHealth {
            status,
            healthy_providers,
            total_providers,
            providers_health,
        }
    }

    /// Force every breaker to Closed and clear every tracker window.
    /// Independent of prior state and idempotent.
    pub fn reset(&self) {
        for entry in self.registry.entries() {
            entry.breaker().force_close();
            entry.tracker().clear();
        }
        tracing::info!(providers = self.registry.len(), "System health state reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GatewayConfig, ProviderConfig};
    use crate::provider::{Provider, ProviderFuture, ProviderRequest, ProviderResponse};
    use std::time::Duration;

    struct NullProvider(&'static str);

    impl Provider for NullProvider {
        fn name(&self) -> &str {
            self.0
        }

        fn call(&self, _request: ProviderRequest) -> ProviderFuture<'_> {
            Box::pin(async { Ok(ProviderResponse::new(serde_json::Value::Null)) })
        }
    }

    fn registry(names: &[&'static str], failure_threshold: u32) -> Arc<ProviderRegistry> {
        let mut config = GatewayConfig {
            providers: names
                .iter()
                .map(|n| ProviderConfig {
                    name: n.to_string(),
                    enabled: true,
                })
                .collect(),
            ..Default::default()
        };
        config.breaker.failure_threshold = failure_threshold;
        let providers = names
            .iter()
            .map(|n| Arc::new(NullProvider(n)) as Arc<dyn Provider>)
            .collect();
        Arc::new(ProviderRegistry::new(providers, &config).unwrap())
    }

    fn open_breaker(registry: &ProviderRegistry, name: &str, failure_threshold: u32) {
        let entry = registry.get(name).unwrap();
        for _ in 0..failure_threshold {
            entry.breaker().record_failure();
        }
        assert_eq!(entry.breaker().state(), CircuitState::Open);
    }

    #[test]
    fn all_closed_is_healthy() {
        let registry = registry(&["a", "b"], 3);
        let aggregator = SystemHealthAggregator::new(registry);
        let health = aggregator.system_health();
        assert_eq!(health.status, SystemStatus::Healthy);
        assert_eq!(health.healthy_providers, 2);
        assert_eq!(health.total_providers, 2);
    }

    #[test]
    fn one_open_is_degraded() {
        let registry = registry(&["a", "b"], 3);
        open_breaker(&registry, "a", 3);
        let aggregator = SystemHealthAggregator::new(registry);
        let health = aggregator.system_health();
        assert_eq!(health.status, SystemStatus::Degraded);
        assert_eq!(health.healthy_providers, 1);
    }

    #[test]
    fn all_open_is_critical() {
        let registry = registry(&["a", "b"], 3);
        open_breaker(&registry, "a", 3);
        open_breaker(&registry, "b", 3);
        let aggregator = SystemHealthAggregator::new(registry);
        assert_eq!(aggregator.system_health().status, SystemStatus::Critical);
    }

    #[test]
    fn reset_restores_all_breakers() {
        let registry = registry(&["a", "b"], 3);
        open_breaker(&registry, "a", 3);
        registry
            .get("b")
            .unwrap()
            .tracker()
            .record_outcome(false, Duration::from_millis(10));

        let aggregator = SystemHealthAggregator::new(registry.clone());
        aggregator.reset();
        aggregator.reset(); // idempotent

        let health = aggregator.system_health();
        assert_eq!(health.status, SystemStatus::Healthy);
        for p in &health.providers_health {
            assert_eq!(p.circuit_state, CircuitState::Closed);
            assert_eq!(p.error_count, 0);
        }
    }

    #[test]
    fn report_preserves_registration_order() {
        let registry = registry(&["zeta", "alpha", "mid"], 3);
        let aggregator = SystemHealthAggregator::new(registry);
        let names: Vec<_> = aggregator
            .system_health()
            .providers_health
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn wire_shape_field_names() {
        let registry = registry(&["a"], 3);
        let aggregator = SystemHealthAggregator::new(registry);
        let json = serde_json::to_value(aggregator.system_health()).unwrap();

        assert_eq!(json["status"], "healthy");
        assert!(json["healthyProviders"].is_number());
        assert!(json["totalProviders"].is_number());
        let provider = &json["providersHealth"][0];
        assert_eq!(provider["circuitState"], "CLOSED");
        assert!(provider["available"].as_bool().unwrap());
        assert!(provider["successRate"].is_number());
        assert!(provider["errorCount"].is_number());
        assert!(provider["responseTime"].is_number());
    }
}
