use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Call or put side of the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    #[serde(rename = "CE")]
    Call,
    #[serde(rename = "PE")]
    Put,
}

impl OptionKind {
    pub const BOTH: [OptionKind; 2] = [OptionKind::Call, OptionKind::Put];

    /// Exchange code used in the instrument catalog ("CE" / "PE")
    pub fn code(&self) -> &'static str {
        match self {
            OptionKind::Call => "CE",
            OptionKind::Put => "PE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "CE" => Some(OptionKind::Call),
            "PE" => Some(OptionKind::Put),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OptionKind::Call => "Call Options",
            OptionKind::Put => "Put Options",
        }
    }
}

/// A tradable contract from the instrument catalog.
///
/// The index itself is also an `Instrument`, with no option type, strike or expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub instrument_token: u64,
    pub tradingsymbol: String,
    pub name: String,
    pub option_type: Option<OptionKind>,
    pub strike: Option<f64>,
    pub expiry: Option<NaiveDate>,
}

/// Snapshot of the instrument catalog and the day it was downloaded
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    instruments: Vec<Instrument>,
    loaded_on: NaiveDate,
}

impl InstrumentCatalog {
    pub fn new(instruments: Vec<Instrument>, loaded_on: NaiveDate) -> Self {
        Self { instruments, loaded_on }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn loaded_on(&self) -> NaiveDate {
        self.loaded_on
    }

    /// Contracts expire daily, so a catalog from a previous day is stale
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.loaded_on != today
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

/// One historical bar. `oi` is only present when open interest was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub oi: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub last_price: f64,
}

// -----------------------------------------------
// CYCLE OUTPUT
// -----------------------------------------------

/// OI change of one instrument over one look-back window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OiDelta {
    pub past_oi: i64,
    pub change: i64,
    pub percentage: f64,
}

/// One table cell; `delta` is `None` when the current OI was unavailable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OiCell {
    pub window_minutes: u32,
    pub delta: Option<OiDelta>,
    pub abnormal: bool,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OiRow {
    pub strike: f64,
    pub tradingsymbol: String,
    pub instrument_token: u64,
    pub current_oi: Option<i64>,
    pub cells: Vec<OiCell>,
}

/// Index price change over a window, or the sentinel when index tracking is off
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexChange {
    Unavailable,
    Change {
        past_price: f64,
        change: f64,
        percentage: f64,
    },
}

impl IndexChange {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, IndexChange::Unavailable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexCell {
    pub window_minutes: u32,
    pub change: IndexChange,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub current_price: f64,
    pub cells: Vec<IndexCell>,
}

/// Abnormal cell counts per side, threaded through classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbnormalTally {
    pub calls: usize,
    pub puts: usize,
}

impl AbnormalTally {
    pub fn record(mut self, kind: OptionKind) -> Self {
        match kind {
            OptionKind::Call => self.calls += 1,
            OptionKind::Put => self.puts += 1,
        }
        self
    }

    pub fn count(&self, kind: OptionKind) -> usize {
        match kind {
            OptionKind::Call => self.calls,
            OptionKind::Put => self.puts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub call_abnormal: usize,
    pub put_abnormal: usize,
    pub total_cells: usize,
    pub call_percentage: f64,
    pub put_percentage: f64,
    pub threshold_percentage: f64,
    pub triggered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub at: NaiveDateTime,
    pub index_price: f64,
    pub atm_strike: Option<f64>,
    pub ladder: Vec<f64>,
    pub windows: Vec<u32>,
    pub calls: Vec<OiRow>,
    pub puts: Vec<OiRow>,
    pub index: IndexSummary,
    pub alert: AlertSummary,
}

impl CycleReport {
    pub fn rows(&self, kind: OptionKind) -> &[OiRow] {
        match kind {
            OptionKind::Call => &self.calls,
            OptionKind::Put => &self.puts,
        }
    }
}

/// Result of one polling cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    Completed(CycleReport),
    Skipped { at: NaiveDateTime, reason: String },
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Completed(report) => Some(report),
            CycleOutcome::Skipped { .. } => None,
        }
    }

    pub fn alert_triggered(&self) -> bool {
        self.report().is_some_and(|r| r.alert.triggered)
    }
}
