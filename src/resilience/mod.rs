//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to a provider:
//!     → invoker.rs (per-call timeout, retry with backoff, failover)
//!     → circuit_breaker.rs (gate every attempt, track failures)
//!     → backoff.rs (delay between retries)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every provider call has a deadline
//! - Only infrastructure failures count toward the breaker; client errors
//!   surface to the caller untouched
//! - Jittered backoff prevents thundering herd
//! - The breaker is never bypassed, regardless of retry budget

pub mod backoff;
pub mod circuit_breaker;
pub mod invoker;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use invoker::{InvocationResult, ResilientInvoker};
