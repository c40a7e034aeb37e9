//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level
//! - `try_init` so embedding applications (and tests) that already installed
//!   a subscriber are left alone

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging subsystem with the configured default level.
pub fn init(log_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ai_gateway={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
