use super::models::AlertSummary;
use colored::Colorize;
use std::io::Write;
use tracing::{debug, warn};

/// Receives the alert decision once per completed cycle
pub trait AlertSink: Send + Sync {
    fn notify(&self, summary: &AlertSummary);
}

/// Rings the terminal bell and prints a banner
#[derive(Debug, Default)]
pub struct BellSink;

impl AlertSink for BellSink {
    fn notify(&self, summary: &AlertSummary) {
        if !summary.triggered {
            return;
        }
        println!(
            "\x07{} abnormal OI change: calls {:.1}%, puts {:.1}% (threshold {:.1}%)",
            "⚠ ALERT".red().bold(),
            summary.call_percentage,
            summary.put_percentage,
            summary.threshold_percentage,
        );
        let _ = std::io::stdout().flush();
    }
}

/// Emits the decision as a structured log event only
#[derive(Debug, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn notify(&self, summary: &AlertSummary) {
        if summary.triggered {
            warn!(
                call_abnormal = summary.call_abnormal,
                put_abnormal = summary.put_abnormal,
                total_cells = summary.total_cells,
                threshold = summary.threshold_percentage,
                "OI alert triggered"
            );
        } else {
            debug!(
                call_abnormal = summary.call_abnormal,
                put_abnormal = summary.put_abnormal,
                "no OI alert"
            );
        }
    }
}
