pub mod api_server_axum;
pub mod kite;
pub mod logging;
pub mod tracker;
pub mod utility;

// Re-exports for convenience
pub use kite::{KiteClient, KiteCredentials, KiteError};
pub use tracker::{
    AlertSink, CycleOutcome, CycleReport, MarketData, OiTracker, OptionKind, TrackerConfig,
};
