use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

// -----------------------------------------------
// FILE LOCATION
// -----------------------------------------------
pub const DEFAULT_CONFIG_FILE: &str = "configs/oi_tracker.json";
pub const DEFAULT_PROFILE: &str = "default";

/// Tracker settings, one profile of the config file.
///
/// Every field has a default so a profile only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Quote key of the index, e.g. "NSE:NIFTY 50"
    pub index_symbol: String,

    /// Trading symbol of the index in the instrument catalog
    pub index_tradingsymbol: String,

    /// Underlying `name` of the option contracts, e.g. "NIFTY"
    pub symbol_initials: String,

    /// Distance between adjacent strikes
    pub strike_increment: f64,

    /// Number of strikes around ATM; odd so the ladder is symmetric
    pub strikes_to_track: usize,

    /// Look-back windows in minutes
    pub time_intervals: Vec<u32>,

    /// Window (minutes) -> abnormal OI change percentage
    pub color_thresholds: BTreeMap<u32, f64>,

    /// Put-side thresholds; windows missing here use `color_thresholds`
    pub put_color_thresholds: Option<BTreeMap<u32, f64>>,

    /// Share of abnormal cells (percent) on either side that raises the alert
    pub alert_threshold_percentage: f64,

    /// Candle interval requested from the historical API
    pub historical_data_interval: String,

    /// Seconds between cycles
    pub cycle_interval_secs: u64,

    /// Consecutive failed cycles before the run stops
    pub max_consecutive_failures: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            index_symbol: "NSE:NIFTY 50".to_string(),
            index_tradingsymbol: "NIFTY 50".to_string(),
            symbol_initials: "NIFTY".to_string(),
            strike_increment: 50.0,
            strikes_to_track: 5,
            time_intervals: vec![5, 10, 15, 30],
            color_thresholds: BTreeMap::from([(5, 5.0), (10, 7.5), (15, 10.0), (30, 15.0)]),
            put_color_thresholds: None,
            alert_threshold_percentage: 20.0,
            historical_data_interval: "minute".to_string(),
            cycle_interval_secs: 60,
            max_consecutive_failures: 3,
        }
    }
}

impl TrackerConfig {
    /// Load `profile` from a JSON profile file (`{"default": {...}, ...}`).
    ///
    /// A missing file falls back to the built-in defaults.
    pub fn load(path: impl AsRef<Path>, profile: &str) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let config = Self::from_json(&text, profile)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!(path = %path.display(), profile, "loaded tracker config");
        Ok(config)
    }

    pub fn from_json(text: &str, profile: &str) -> Result<Self> {
        let mut profiles: HashMap<String, TrackerConfig> =
            serde_json::from_str(text).context("Failed to parse config JSON")?;

        match profiles.remove(profile) {
            Some(config) => Ok(config),
            None => {
                let mut names: Vec<_> = profiles.into_keys().collect();
                names.sort();
                bail!("Profile '{}' not found (available: {})", profile, names.join(", "))
            }
        }
    }

    /// Load using `OI_CONFIG_FILE` and `OI_PROFILE`
    pub fn from_env() -> Result<Self> {
        let path = std::env::var("OI_CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let profile = std::env::var("OI_PROFILE").unwrap_or_else(|_| DEFAULT_PROFILE.to_string());
        let config = Self::load(&path, &profile)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.strike_increment.is_finite() || self.strike_increment <= 0.0 {
            bail!("strike_increment must be positive, got {}", self.strike_increment);
        }
        if self.time_intervals.is_empty() {
            bail!("time_intervals must list at least one window");
        }
        if self.time_intervals.contains(&0) {
            bail!("time_intervals must be positive minutes");
        }
        if self.cycle_interval_secs == 0 {
            bail!("cycle_interval_secs must be positive");
        }
        if !self.alert_threshold_percentage.is_finite() {
            bail!("alert_threshold_percentage must be finite");
        }
        let thresholds = self
            .color_thresholds
            .values()
            .chain(self.put_color_thresholds.iter().flat_map(|t| t.values()));
        for t in thresholds {
            if t.is_nan() {
                bail!("color thresholds must be numbers");
            }
        }

        if self.strikes_to_track % 2 == 0 {
            warn!(
                strikes_to_track = self.strikes_to_track,
                "even strikes_to_track, ladder will hold {} strikes",
                self.strikes_to_track.saturating_sub(1)
            );
        }
        for w in &self.time_intervals {
            if !self.color_thresholds.contains_key(w) {
                warn!(window = w, "no color threshold for window, it will never be flagged");
            }
        }
        Ok(())
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }
}
