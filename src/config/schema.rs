//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the AI gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Provider definitions, in priority order. The invoker tries providers
    /// in the order they appear here.
    pub providers: Vec<ProviderConfig>,

    /// Circuit breaker settings (shared by every provider's breaker).
    pub breaker: BreakerConfig,

    /// Retry/backoff settings for the invoker.
    pub retry: RetryConfig,

    /// Rolling health window settings.
    pub health: HealthConfig,

    /// Client-side recovery settings (error boundary + stall detection).
    pub recovery: RecoveryConfig,

    /// Monitoring/reporting settings.
    pub monitoring: MonitoringConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// A single provider entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Unique provider identifier (e.g., "openai", "anthropic").
    pub name: String,

    /// Whether this provider participates in invocations. Disabled providers
    /// keep their registration slot but are never called and report as
    /// unavailable.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive counted failures before the breaker opens.
    pub failure_threshold: u32,

    /// How long an open breaker fast-fails before allowing a trial, in ms.
    pub cooldown_ms: u64,

    /// Consecutive half-open successes required to close the breaker.
    pub success_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown_ms: 30_000,
            success_threshold: 2,
        }
    }
}

/// Retry and backoff configuration for the invoker.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum retries per provider (on top of the initial attempt).
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Backoff multiplier applied per attempt.
    pub multiplier: f64,

    /// Maximum backoff delay in milliseconds.
    pub cap_ms: u64,

    /// Apply random jitter (0-10% of the delay) to avoid retry storms.
    pub jitter: bool,

    /// Per-call timeout in milliseconds. Every provider call runs under this
    /// deadline; exceeding it counts as an infrastructure failure.
    pub call_timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            multiplier: 2.0,
            cap_ms: 8_000,
            jitter: true,
            call_timeout_ms: 30_000,
        }
    }
}

/// Rolling health window configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Maximum samples retained per provider.
    pub max_samples: usize,

    /// Maximum sample age in milliseconds. Older samples are evicted.
    pub window_ms: u64,

    /// Suggested poll period for health consumers, in seconds.
    pub refresh_interval_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_samples: 50,
            window_ms: 60_000,
            refresh_interval_secs: 30,
        }
    }
}

/// Client-side recovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Enable automatic recovery retries. When disabled, every caught error
    /// goes straight to the manual-failure state.
    pub enabled: bool,

    /// Maximum automatic retries before requiring manual action.
    pub max_retries: u32,

    /// Base delay for recovery backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum recovery backoff delay in milliseconds.
    pub cap_ms: u64,

    /// How long a loading operation may run before it is reported as
    /// stalled, in milliseconds.
    pub stall_timeout_ms: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            base_delay_ms: 1_000,
            cap_ms: 10_000,
            stall_timeout_ms: 30_000,
        }
    }
}

/// Monitoring and reporting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Endpoint for best-effort error reports. Reporting is disabled when
    /// unset.
    pub report_endpoint: Option<String>,

    /// API key protecting the reset endpoint (Bearer token).
    pub api_key: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            report_endpoint: None,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
