//! Error taxonomy for the gateway.
//!
//! # Design Decisions
//! - Provider failures are classified once, at the call site, into
//!   infrastructure-level failures (timeout, network, 5xx, rate-limit) and
//!   client errors (malformed request). Only infrastructure failures feed the
//!   circuit breaker and the retry loop.
//! - Errors are typed and propagated to the caller; nothing is swallowed
//!   except monitoring delivery, which is explicitly best-effort.

use thiserror::Error;

/// A failure returned by a provider call (or synthesized by the per-call
/// timeout in the invoker).
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("provider call timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Whether this failure is infrastructure-level.
    ///
    /// Infrastructure failures count toward the circuit breaker and are
    /// eligible for retry. Client errors (and unclassifiable errors) are
    /// surfaced to the caller without touching breaker state.
    pub fn is_infrastructure(&self) -> bool {
        match self {
            ProviderError::Timeout => true,
            ProviderError::Network(_) => true,
            ProviderError::RateLimited(_) => true,
            ProviderError::Server { status, .. } => *status >= 500,
            ProviderError::InvalidRequest(_) => false,
            ProviderError::Other(_) => false,
        }
    }

    /// Retryability currently coincides with the infrastructure classification.
    pub fn is_retryable(&self) -> bool {
        self.is_infrastructure()
    }
}

/// A failure of one logical invocation across the provider list.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The request itself was rejected by a provider (client error). Retrying
    /// or failing over would reproduce the same rejection, so the invocation
    /// stops immediately.
    #[error("request rejected by provider '{provider}': {source}")]
    Rejected {
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// The named provider's circuit is open; the call was never made.
    #[error("circuit open for provider '{0}'")]
    CircuitOpen(String),

    /// No provider with the given name is registered.
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    /// Every candidate provider was skipped or exhausted.
    #[error("all providers unavailable after {attempts} attempt(s): {}", .last_error.as_deref().unwrap_or("no attempts completed"))]
    AllProvidersUnavailable {
        attempts: u32,
        /// Description of the last provider failure, if any attempt was
        /// actually made.
        last_error: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infrastructure_classification() {
        assert!(ProviderError::Timeout.is_infrastructure());
        assert!(ProviderError::Network("connection refused".into()).is_infrastructure());
        assert!(ProviderError::RateLimited("quota exceeded".into()).is_infrastructure());
        assert!(ProviderError::Server {
            status: 503,
            message: "unavailable".into()
        }
        .is_infrastructure());

        assert!(!ProviderError::InvalidRequest("missing field".into()).is_infrastructure());
        assert!(!ProviderError::Server {
            status: 400,
            message: "bad request".into()
        }
        .is_infrastructure());
        assert!(!ProviderError::Other("unclassified".into()).is_infrastructure());
    }

    #[test]
    fn exhaustion_message_carries_last_error() {
        let err = InvokeError::AllProvidersUnavailable {
            attempts: 4,
            last_error: Some("network error: connection refused".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("4 attempt(s)"));
        assert!(msg.contains("connection refused"));

        let empty = InvokeError::AllProvidersUnavailable {
            attempts: 0,
            last_error: None,
        };
        assert!(empty.to_string().contains("no attempts completed"));
    }
}
