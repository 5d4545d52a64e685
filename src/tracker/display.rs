use super::models::{CycleOutcome, CycleReport, OptionKind};
use super::processor::UNAVAILABLE;
use colored::Colorize;

/// A table cell and whether it should be highlighted
pub type Cell = (String, bool);

pub fn format_strike(strike: f64) -> String {
    if strike.fract() == 0.0 {
        format!("{:.0}", strike)
    } else {
        format!("{:.2}", strike)
    }
}

fn window_headers(first: &[&str], windows: &[u32]) -> Vec<String> {
    first
        .iter()
        .map(|h| h.to_string())
        .chain(windows.iter().map(|m| format!("{}m", m)))
        .collect()
}

/// Right-aligned plain-text table; highlighted cells are printed red
pub fn render_table(headers: &[String], rows: &[Vec<Cell>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, (text, _)) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(text.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:>w$}", h, w = w))
        .collect();
    out.push_str(&header_line.join("  "));

    for row in rows {
        out.push('\n');
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|((text, highlight), w)| {
                let padded = format!("{:>w$}", text, w = w);
                if *highlight {
                    padded.red().to_string()
                } else {
                    padded
                }
            })
            .collect();
        out.push_str(&line.join("  "));
    }
    out
}

pub fn render_side(report: &CycleReport, kind: OptionKind) -> String {
    let headers = window_headers(&["Strike", "Current OI"], &report.windows);
    let rows: Vec<Vec<Cell>> = report
        .rows(kind)
        .iter()
        .map(|row| {
            let current = row
                .current_oi
                .map(|oi| oi.to_string())
                .unwrap_or_else(|| UNAVAILABLE.to_string());
            let mut cells = vec![(format_strike(row.strike), false), (current, false)];
            cells.extend(row.cells.iter().map(|c| (c.display.clone(), c.abnormal)));
            cells
        })
        .collect();
    render_table(&headers, &rows)
}

pub fn render_index(report: &CycleReport) -> String {
    let headers = window_headers(&["Current Price"], &report.windows);
    let mut row = vec![(format!("{:.2}", report.index.current_price), false)];
    row.extend(report.index.cells.iter().map(|c| (c.display.clone(), false)));
    render_table(&headers, &[row])
}

pub fn print_report(report: &CycleReport) {
    println!("{}", "=".repeat(60).blue());
    println!(
        "{} {}  spot {:.2}  ATM {}",
        "OI Tracker".green().bold(),
        report.at.format("%Y-%m-%d %H:%M:%S"),
        report.index_price,
        report
            .atm_strike
            .map(format_strike)
            .unwrap_or_else(|| UNAVAILABLE.to_string()),
    );
    println!("{}", "=".repeat(60).blue());

    for kind in OptionKind::BOTH {
        println!("\n{}", format!("--- {} ---", kind.label()).cyan());
        println!("{}", render_side(report, kind));
    }

    println!("\n{}", "--- Index ---".cyan());
    println!("{}", render_index(report));

    let alert = &report.alert;
    let line = format!(
        "Abnormal cells: calls {}/{} ({:.1}%), puts {}/{} ({:.1}%), threshold {:.1}%",
        alert.call_abnormal,
        alert.total_cells,
        alert.call_percentage,
        alert.put_abnormal,
        alert.total_cells,
        alert.put_percentage,
        alert.threshold_percentage,
    );
    if alert.triggered {
        println!("\n{} {}", "⚠".red(), line.red().bold());
    } else {
        println!("\n{} {}", "ℹ".blue(), line);
    }
}

pub fn print_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Completed(report) => print_report(report),
        CycleOutcome::Skipped { at, reason } => {
            println!(
                "{} {} cycle skipped: {}",
                "⚠".yellow(),
                at.format("%H:%M:%S"),
                reason
            );
        }
    }
}
