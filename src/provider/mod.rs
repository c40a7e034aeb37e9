//! Provider abstraction.
//!
//! # Responsibilities
//! - Define the interface every LLM backend implements
//! - Keep request/response payloads opaque to the resilience layer
//!
//! # Design Decisions
//! - Payloads are `serde_json::Value`; the gateway routes and protects calls
//!   but never inspects provider schemas
//! - The trait returns a boxed future so implementations stay object-safe
//!   and the registry can hold `Arc<dyn Provider>`
//! - Provider order is fixed at registration; the registry preserves it

pub mod registry;

use crate::error::ProviderError;
use std::future::Future;
use std::pin::Pin;

pub use registry::{ProviderEntry, ProviderRegistry};

/// An opaque request routed to a provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub payload: serde_json::Value,
}

impl ProviderRequest {
    pub fn new(payload: serde_json::Value) -> Self {
        Self { payload }
    }
}

/// An opaque response returned by a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub payload: serde_json::Value,
}

impl ProviderResponse {
    pub fn new(payload: serde_json::Value) -> Self {
        Self { payload }
    }
}

pub type ProviderFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ProviderResponse, ProviderError>> + Send + 'a>>;

/// An interchangeable LLM backend.
pub trait Provider: Send + Sync {
    /// Stable provider identifier. Must match a configured provider name.
    fn name(&self) -> &str;

    /// Perform one call. Implementations report failures through
    /// [`ProviderError`] so the invoker can classify them.
    fn call(&self, request: ProviderRequest) -> ProviderFuture<'_>;
}
