use super::config::TrackerConfig;
use super::models::{AbnormalTally, AlertSummary, OptionKind};

/// Abnormal-change threshold (percent) for a window and side.
///
/// Windows with no configured threshold never trigger.
pub fn threshold_for(config: &TrackerConfig, window_minutes: u32, kind: OptionKind) -> f64 {
    let side_override = match kind {
        OptionKind::Put => config.put_color_thresholds.as_ref(),
        OptionKind::Call => None,
    };

    side_override
        .and_then(|t| t.get(&window_minutes))
        .or_else(|| config.color_thresholds.get(&window_minutes))
        .copied()
        .unwrap_or(f64::INFINITY)
}

pub fn is_abnormal(percentage: f64, threshold: f64) -> bool {
    percentage > threshold
}

/// Classify one cell and fold it into the tally
pub fn classify(
    tally: AbnormalTally,
    kind: OptionKind,
    percentage: f64,
    threshold: f64,
) -> (bool, AbnormalTally) {
    if is_abnormal(percentage, threshold) {
        (true, tally.record(kind))
    } else {
        (false, tally)
    }
}

fn share(count: usize, total_cells: usize) -> f64 {
    if total_cells == 0 {
        return 0.0;
    }
    count as f64 / total_cells as f64 * 100.0
}

/// Decide whether this cycle raises the alert.
///
/// `total_cells` is ladder length times window count. The alert fires when
/// either side's abnormal share is strictly above `threshold_percentage`.
pub fn evaluate_alert(
    tally: AbnormalTally,
    total_cells: usize,
    threshold_percentage: f64,
) -> AlertSummary {
    let call_percentage = share(tally.calls, total_cells);
    let put_percentage = share(tally.puts, total_cells);
    let triggered = total_cells > 0
        && (call_percentage > threshold_percentage || put_percentage > threshold_percentage);

    AlertSummary {
        call_abnormal: tally.calls,
        put_abnormal: tally.puts,
        total_cells,
        call_percentage,
        put_percentage,
        threshold_percentage,
        triggered,
    }
}
