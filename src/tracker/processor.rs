use super::models::{IndexCell, IndexChange, OiCell, OiDelta};

pub const UNAVAILABLE: &str = "N/A";

/// Percentage change from `past` to `current`; a zero baseline yields 0
pub fn percentage_change(current: f64, past: f64) -> f64 {
    if past == 0.0 {
        return 0.0;
    }
    (current - past) / past * 100.0
}

/// OI delta for one window
pub fn oi_delta(current_oi: i64, past_oi: i64) -> OiDelta {
    OiDelta {
        past_oi,
        change: current_oi - past_oi,
        percentage: percentage_change(current_oi as f64, past_oi as f64),
    }
}

/// Index price change for one window
pub fn index_change(current_price: f64, past_price: f64) -> IndexChange {
    IndexChange::Change {
        past_price,
        change: current_price - past_price,
        percentage: percentage_change(current_price, past_price),
    }
}

pub fn format_oi_delta(delta: Option<&OiDelta>) -> String {
    match delta {
        Some(d) => format!("{:.2}% ({})", d.percentage, d.change),
        None => UNAVAILABLE.to_string(),
    }
}

pub fn format_index_change(change: &IndexChange) -> String {
    match change {
        IndexChange::Change { change, percentage, .. } => {
            format!("{:.2}% ({:.2})", percentage, change)
        }
        IndexChange::Unavailable => UNAVAILABLE.to_string(),
    }
}

pub fn oi_cell(window_minutes: u32, delta: Option<OiDelta>, abnormal: bool) -> OiCell {
    let display = format_oi_delta(delta.as_ref());
    OiCell {
        window_minutes,
        delta,
        abnormal,
        display,
    }
}

pub fn index_cell(window_minutes: u32, change: IndexChange) -> IndexCell {
    let display = format_index_change(&change);
    IndexCell {
        window_minutes,
        change,
        display,
    }
}

/// Index cells for every window when the index instrument is unknown
pub fn unavailable_index_cells(windows: &[u32]) -> Vec<IndexCell> {
    windows
        .iter()
        .map(|&w| index_cell(w, IndexChange::Unavailable))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(120.0, 100.0), 20.0);
        assert_eq!(percentage_change(50.0, 100.0), -50.0);
    }

    #[test]
    fn test_zero_baseline_is_zero() {
        assert_eq!(percentage_change(12345.0, 0.0), 0.0);
        assert_eq!(percentage_change(0.0, 0.0), 0.0);
        assert_eq!(percentage_change(-10.0, 0.0), 0.0);

        let delta = oi_delta(5000, 0);
        assert_eq!(delta.change, 5000);
        assert_eq!(delta.percentage, 0.0);
    }

    #[test]
    fn test_cell_formatting() {
        let cell = oi_cell(5, Some(oi_delta(1500, 1000)), true);
        assert_eq!(cell.display, "50.00% (500)");

        let empty = oi_cell(5, None, false);
        assert_eq!(empty.display, "N/A");

        let idx = index_cell(15, index_change(19850.5, 19800.0));
        assert_eq!(idx.display, "0.26% (50.50)");
    }

    #[test]
    fn test_unavailable_index_cells() {
        let cells = unavailable_index_cells(&[5, 10, 15]);
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().all(|c| c.change.is_unavailable() && c.display == "N/A"));
    }
}
