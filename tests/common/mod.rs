//! Shared utilities for integration testing.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use ai_gateway::config::{GatewayConfig, ProviderConfig};
use ai_gateway::error::ProviderError;
use ai_gateway::provider::{
    Provider, ProviderFuture, ProviderRegistry, ProviderRequest, ProviderResponse,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted call outcome.
#[derive(Debug, Clone)]
pub enum Outcome {
    Succeed,
    Fail(ProviderError),
    /// Never complete; exercises the per-call timeout and stall paths.
    Hang,
}

/// A provider that replays a script of outcomes, then falls back to a fixed
/// outcome once the script is consumed.
pub struct ScriptedProvider {
    name: String,
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    latency: Duration,
    calls: AtomicU32,
}

impl ScriptedProvider {
    pub fn new(name: &str, script: Vec<Outcome>, fallback: Outcome) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            script: Mutex::new(script.into()),
            fallback,
            latency: Duration::ZERO,
            calls: AtomicU32::new(0),
        })
    }

    pub fn always_ok(name: &str) -> Arc<Self> {
        Self::new(name, Vec::new(), Outcome::Succeed)
    }

    pub fn always_failing(name: &str, error: ProviderError) -> Arc<Self> {
        Self::new(name, Vec::new(), Outcome::Fail(error))
    }

    /// How many times the provider was actually called.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, _request: ProviderRequest) -> ProviderFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        let latency = self.latency;
        let name = self.name.clone();

        Box::pin(async move {
            match outcome {
                Outcome::Succeed => {
                    tokio::time::sleep(latency).await;
                    Ok(ProviderResponse::new(
                        serde_json::json!({ "provider": name, "itinerary": "3 days in Lisbon" }),
                    ))
                }
                Outcome::Fail(error) => {
                    tokio::time::sleep(latency).await;
                    Err(error)
                }
                Outcome::Hang => {
                    tokio::time::sleep(Duration::from_secs(86_400)).await;
                    Err(ProviderError::Other("hung call completed".into()))
                }
            }
        })
    }
}

/// Config with fast, deterministic resilience settings for tests.
pub fn test_config(names: &[&str]) -> GatewayConfig {
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
    config.breaker.failure_threshold = 3;
    config.breaker.cooldown_ms = 5_000;
    config.breaker.success_threshold = 1;
    config.retry.max_retries = 1;
    config.retry.base_delay_ms = 100;
    config.retry.cap_ms = 1_000;
    config.retry.jitter = false;
    config.retry.call_timeout_ms = 2_000;
    config
}

/// Build an isolated registry from scripted providers.
pub fn registry(
    providers: &[Arc<ScriptedProvider>],
    config: &GatewayConfig,
) -> Arc<ProviderRegistry> {
    let providers: Vec<Arc<dyn Provider>> = providers
        .iter()
        .map(|p| p.clone() as Arc<dyn Provider>)
        .collect();
    Arc::new(ProviderRegistry::new(providers, config).unwrap())
}

pub fn request() -> ProviderRequest {
    ProviderRequest::new(serde_json::json!({
        "destination": "Lisbon",
        "days": 3,
        "interests": ["food", "history"],
    }))
}
