//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check provider list integrity (non-empty, unique names)
//! - Validate value ranges (thresholds > 0, cap >= base)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system

use crate::config::schema::GatewayConfig;
use thiserror::Error;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("at least one provider must be configured")]
    NoProviders,

    #[error("provider name must not be empty")]
    EmptyProviderName,

    #[error("duplicate provider name: {0}")]
    DuplicateProvider(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("retry.multiplier must be >= 1.0, got {0}")]
    MultiplierTooSmall(f64),

    #[error("retry.cap_ms ({cap_ms}) must be >= retry.base_delay_ms ({base_delay_ms})")]
    CapBelowBase { cap_ms: u64, base_delay_ms: u64 },

    #[error("recovery.cap_ms ({cap_ms}) must be >= recovery.base_delay_ms ({base_delay_ms})")]
    RecoveryCapBelowBase { cap_ms: u64, base_delay_ms: u64 },

    #[error("invalid metrics address: {0}")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.providers.is_empty() {
        errors.push(ValidationError::NoProviders);
    }

    let mut seen = std::collections::HashSet::new();
    for provider in &config.providers {
        if provider.name.trim().is_empty() {
            errors.push(ValidationError::EmptyProviderName);
        } else if !seen.insert(provider.name.as_str()) {
            errors.push(ValidationError::DuplicateProvider(provider.name.clone()));
        }
    }

    if config.breaker.failure_threshold == 0 {
        errors.push(ValidationError::ZeroValue("breaker.failure_threshold"));
    }
    if config.breaker.success_threshold == 0 {
        errors.push(ValidationError::ZeroValue("breaker.success_threshold"));
    }
    if config.breaker.cooldown_ms == 0 {
        errors.push(ValidationError::ZeroValue("breaker.cooldown_ms"));
    }

    if config.retry.call_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("retry.call_timeout_ms"));
    }
    if config.retry.multiplier < 1.0 {
        errors.push(ValidationError::MultiplierTooSmall(config.retry.multiplier));
    }
    if config.retry.cap_ms < config.retry.base_delay_ms {
        errors.push(ValidationError::CapBelowBase {
            cap_ms: config.retry.cap_ms,
            base_delay_ms: config.retry.base_delay_ms,
        });
    }

    if config.health.max_samples == 0 {
        errors.push(ValidationError::ZeroValue("health.max_samples"));
    }
    if config.health.window_ms == 0 {
        errors.push(ValidationError::ZeroValue("health.window_ms"));
    }

    if config.recovery.cap_ms < config.recovery.base_delay_ms {
        errors.push(ValidationError::RecoveryCapBelowBase {
            cap_ms: config.recovery.cap_ms,
            base_delay_ms: config.recovery.base_delay_ms,
        });
    }
    if config.recovery.stall_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("recovery.stall_timeout_ms"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
