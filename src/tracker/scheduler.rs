use super::config::TrackerConfig;
use super::market_data::MarketData;
use super::models::CycleOutcome;
use super::oi_tracker::OiTracker;
use crate::utility::Timer;
use anyhow::Result;
use chrono::Local;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub interval: Duration,
    /// Failed cycles in a row that stop the run (at least 1)
    pub max_consecutive_failures: u32,
}

impl From<&TrackerConfig> for SchedulerSettings {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            interval: config.cycle_interval(),
            max_consecutive_failures: config.max_consecutive_failures,
        }
    }
}

/// Counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: u64,
    pub skipped: u64,
    pub failed: u64,
    pub alerts: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Completed(report) => {
                self.completed += 1;
                if report.alert.triggered {
                    self.alerts += 1;
                }
            }
            CycleOutcome::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Drive `tracker` every `settings.interval` until `shutdown` resolves.
///
/// Each finished cycle is handed to `on_outcome`. A failed cycle is logged
/// and the loop continues; once `max_consecutive_failures` cycles fail in a
/// row the last error is returned.
pub async fn run<M, S, F>(
    tracker: &mut OiTracker<M>,
    settings: SchedulerSettings,
    shutdown: S,
    mut on_outcome: F,
) -> Result<RunSummary>
where
    M: MarketData,
    S: Future<Output = ()>,
    F: FnMut(&CycleOutcome),
{
    tokio::pin!(shutdown);
    let failure_limit = settings.max_consecutive_failures.max(1);
    let mut consecutive_failures = 0u32;
    let mut summary = RunSummary::default();

    loop {
        let now = Local::now().naive_local();
        let timer = Timer::start_with_budget("oi cycle", settings.interval);

        let result = tokio::select! {
            res = tracker.run_cycle(now) => res,
            _ = &mut shutdown => {
                info!("shutdown requested, abandoning cycle in flight");
                return Ok(summary);
            }
        };
        timer.stop();

        match result {
            Ok(outcome) => {
                consecutive_failures = 0;
                summary.record(&outcome);
                on_outcome(&outcome);
            }
            Err(e) => {
                consecutive_failures += 1;
                summary.failed += 1;
                error!(error = format!("{:#}", e), consecutive_failures, "cycle failed");

                if consecutive_failures >= failure_limit {
                    return Err(e.context(format!(
                        "Stopping after {} consecutive failed cycles",
                        consecutive_failures
                    )));
                }
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(settings.interval) => {}
            _ = &mut shutdown => {
                info!(?summary, "shutdown requested");
                return Ok(summary);
            }
        }
    }
}
