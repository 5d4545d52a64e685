// ============================================
// TIMING UTILITY - Cycle duration logging
// ============================================
// Usage:
//   let timer = Timer::start("cycle"); ... timer.stop();
//   let out = Timer::measure_async("cycle", async { ... }).await;
// ============================================

use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Timer that logs its duration when stopped
pub struct Timer {
    name: String,
    start: Instant,
    slow_after: Duration,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self::start_with_budget(name, Duration::MAX)
    }

    /// Warn instead of info when the timer runs past `slow_after`
    pub fn start_with_budget(name: impl Into<String>, slow_after: Duration) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            slow_after,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn stop(self) -> Duration {
        let duration = self.start.elapsed();
        let ms = duration.as_millis() as u64;
        if duration > self.slow_after {
            warn!(timer = %self.name, elapsed_ms = ms, "{} {} took longer than budget", Self::emoji(ms), self.name);
        } else {
            info!(timer = %self.name, elapsed_ms = ms, "{} {} done", Self::emoji(ms), self.name);
        }
        duration
    }

    fn emoji(ms: u64) -> &'static str {
        match ms {
            0..=500 => "⚡",
            501..=5000 => "⏱️",
            5001..=30000 => "🐌",
            _ => "🔥",
        }
    }

    /// Time an async block
    pub async fn measure_async<F, R>(name: impl Into<String>, fut: F) -> R
    where
        F: Future<Output = R>,
    {
        let timer = Self::start(name);
        let result = fut.await;
        timer.stop();
        result
    }
}
