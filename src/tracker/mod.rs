pub mod alert_sink;
pub mod config;
pub mod display;
pub mod ladder;
pub mod market_data;
pub mod models;
pub mod oi_tracker;
pub mod processor;
pub mod resolver;
pub mod rules;
pub mod scheduler;

// Re-exports (public API)
pub use alert_sink::{AlertSink, BellSink, LogSink};
pub use config::TrackerConfig;
pub use ladder::{atm_strike, build_ladder};
pub use market_data::MarketData;
pub use models::{
    AbnormalTally, AlertSummary, Candle, CycleOutcome, CycleReport, IndexCell, IndexChange,
    IndexSummary, Instrument, InstrumentCatalog, OiCell, OiDelta, OiRow, OptionKind, Quote,
};
pub use oi_tracker::OiTracker;
pub use processor::{index_change, oi_delta, percentage_change};
pub use resolver::{resolve, resolve_index};
pub use rules::{classify, evaluate_alert, is_abnormal, threshold_for};
pub use scheduler::{RunSummary, SchedulerSettings};
