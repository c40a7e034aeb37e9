//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Completed provider attempts:
//!     → tracker.rs (rolling window of outcomes per provider)
//!
//! Monitoring poll (e.g. every 30s):
//!     → aggregator.rs reads every breaker + window
//!     → SystemHealth { status, counts, per-provider breakdown }
//!
//! Operator reset:
//!     → aggregator.rs force-closes breakers, clears windows
//! ```
//!
//! # Design Decisions
//! - Health state is per-provider; the aggregate is derived, never stored
//! - Windows are bounded by both sample count and age

pub mod aggregator;
pub mod tracker;

pub use aggregator::{ProviderHealth, SystemHealth, SystemHealthAggregator, SystemStatus};
pub use tracker::{HealthTracker, WindowStats};
