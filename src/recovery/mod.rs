//! Client-side recovery subsystem.
//!
//! # Data Flow
//! ```text
//! Error escaping a rendering/async boundary:
//!     → controller.rs (classify, backoff retry, or manual-failure state)
//!     → report.rs (fire-and-forget report to monitoring)
//!
//! Long-running load:
//!     → stall.rs (one-shot stall timer, advisory callback)
//! ```
//!
//! # Design Decisions
//! - Backend retries (invoker) and client recovery are independent loops;
//!   both are bounded and terminate in a user-actionable state
//! - All timers are owned per controller/detector instance and cleared on
//!   teardown

pub mod controller;
pub mod report;
pub mod stall;

pub use controller::{
    default_recoverable, friendly_message, RecoveryController, RecoveryPredicate, RecoveryState,
};
pub use report::{ErrorReport, ErrorReporter};
pub use stall::{LoadingState, StallDetector};
