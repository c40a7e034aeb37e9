//! Exponential backoff with jitter.

use crate::config::RetryConfig;
use rand::Rng;
use std::time::Duration;

/// Delay before retry number `attempt` (0-based): `min(base * multiplier^attempt, cap)`,
/// plus 0-10% jitter when enabled.
pub fn retry_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let exponential = config.multiplier.powi(attempt as i32);
    let delay_ms = (config.base_delay_ms as f64 * exponential) as u64;
    let capped_delay = delay_ms.min(config.cap_ms);

    let jitter = if config.jitter {
        let jitter_range = capped_delay / 10;
        if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        }
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}
