//! AI Provider Resilience Gateway
//!
//! Keeps an application usable when individual AI providers are slow,
//! rate-limited, or down: callers never block indefinitely and failing
//! dependencies are never hammered.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                   AI GATEWAY                      │
//!                 │                                                   │
//!  invoke(req) ───┼─▶ resilience::invoker ──▶ breaker.allow()? ──────┼─▶ Provider A
//!                 │        │   retry w/ backoff, per-call timeout,   │   Provider B
//!                 │        │   failover in priority order            │   Provider C
//!                 │        ▼                                          │
//!                 │   completed attempts recorded into               │
//!                 │   circuit_breaker + health::tracker              │
//!                 │                                                   │
//!  health poll ───┼─▶ health::aggregator ──▶ SystemHealth JSON       │
//!  reset ─────────┼─▶ force-close breakers, clear windows            │
//!                 │                                                   │
//!                 │  ┌─────────────────────────────────────────────┐ │
//!                 │  │            Cross-Cutting Concerns            │ │
//!                 │  │  config   recovery (error boundary + stall)  │ │
//!                 │  │  observability (tracing + metrics)   api    │ │
//!                 │  └─────────────────────────────────────────────┘ │
//!                 └──────────────────────────────────────────────────┘
//! ```
//!
//! State is in-process only: horizontally scaled deployments hold
//! independent circuit state per instance.

// Core subsystems
pub mod config;
pub mod provider;
pub mod resilience;

// Health reporting
pub mod health;

// Client-side recovery
pub mod recovery;

// Cross-cutting concerns
pub mod api;
pub mod error;
pub mod observability;

pub use config::GatewayConfig;
pub use error::{InvokeError, ProviderError};
pub use health::{ProviderHealth, SystemHealth, SystemHealthAggregator, SystemStatus};
pub use provider::{Provider, ProviderRegistry, ProviderRequest, ProviderResponse};
pub use resilience::{CircuitState, InvocationResult, ResilientInvoker};
