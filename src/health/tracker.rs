//! Rolling-window outcome tracking.
//!
//! # Responsibilities
//! - Keep a bounded window of recent call outcomes per provider
//! - Derive success rate, error count, and average latency
//!
//! # Design Decisions
//! - The window is both count-bounded (`max_samples`) and time-bounded
//!   (`window_ms`); stale samples are evicted on every write and read
//! - `response_time_ms` is the window-average latency, not the most recent
//!   sample; an empty window reports 0
//! - An empty window reports a 100% success rate (no evidence of failure)
//! - Single short critical section per operation; no await while locked

use crate::config::HealthConfig;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Sample {
    at: Instant,
    success: bool,
    latency_ms: u64,
}

/// Derived statistics over the current window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Percentage of successful outcomes, 0-100.
    pub success_rate: f64,
    /// Failed outcomes currently in the window.
    pub error_count: u64,
    /// Window-average latency in milliseconds.
    pub response_time_ms: u64,
    /// Total samples currently in the window.
    pub samples: usize,
}

/// Per-provider rolling health window.
#[derive(Debug)]
pub struct HealthTracker {
    config: HealthConfig,
    window: Mutex<VecDeque<Sample>>,
}

impl HealthTracker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            window: Mutex::new(VecDeque::new()),
        }
    }

    /// Append an outcome and evict anything stale.
    pub fn record_outcome(&self, success: bool, latency: Duration) {
        let mut window = self.lock();
        window.push_back(Sample {
            at: Instant::now(),
            success,
            latency_ms: latency.as_millis() as u64,
        });
        self.evict(&mut window);
    }

    /// Derived statistics for the current window.
    pub fn stats(&self) -> WindowStats {
        let mut window = self.lock();
        self.evict(&mut window);

        let samples = window.len();
        if samples == 0 {
            return WindowStats {
                success_rate: 100.0,
                error_count: 0,
                response_time_ms: 0,
                samples: 0,
            };
        }

        let successes = window.iter().filter(|s| s.success).count();
        let latency_sum: u64 = window.iter().map(|s| s.latency_ms).sum();

        WindowStats {
            success_rate: successes as f64 * 100.0 / samples as f64,
            error_count: (samples - successes) as u64,
            response_time_ms: latency_sum / samples as u64,
            samples,
        }
    }

    /// Drop every sample. Used by the system-wide reset.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn evict(&self, window: &mut VecDeque<Sample>) {
        while window.len() > self.config.max_samples {
            window.pop_front();
        }
        let max_age = Duration::from_millis(self.config.window_ms);
        while let Some(front) = window.front() {
            if front.at.elapsed() > max_age {
                window.pop_front();
            } else {
                break;
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Sample>> {
        self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
