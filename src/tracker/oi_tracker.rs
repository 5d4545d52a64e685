use super::alert_sink::AlertSink;
use super::config::TrackerConfig;
use super::market_data::MarketData;
use super::models::{
    AbnormalTally, CycleOutcome, CycleReport, IndexCell, IndexSummary, Instrument,
    InstrumentCatalog, OiRow, OptionKind,
};
use super::{ladder, processor, resolver, rules};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tracing::{debug, error, info, warn};

/// Width of every historical lookup, in minutes
const SAMPLE_SPAN_MINUTES: i64 = 1;

/// Windowed OI tracker for one index.
///
/// Owns the market-data connection and the instrument catalog. Everything
/// else is rebuilt on each call to [`OiTracker::run_cycle`].
pub struct OiTracker<M: MarketData> {
    market: M,
    config: TrackerConfig,
    sink: Box<dyn AlertSink>,
    catalog: Option<InstrumentCatalog>,
    index_instrument: Option<Instrument>,
}

impl<M: MarketData> OiTracker<M> {
    pub fn new(market: M, config: TrackerConfig, sink: Box<dyn AlertSink>) -> Self {
        Self {
            market,
            config,
            sink,
            catalog: None,
            index_instrument: None,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn catalog(&self) -> Option<&InstrumentCatalog> {
        self.catalog.as_ref()
    }

    pub fn index_instrument(&self) -> Option<&Instrument> {
        self.index_instrument.as_ref()
    }

    /// Download the catalog and re-resolve the index instrument
    pub async fn refresh_catalog(&mut self, today: NaiveDate) -> Result<()> {
        let instruments = self
            .market
            .instruments()
            .await
            .context("Failed to download instrument catalog")?;
        let catalog = InstrumentCatalog::new(instruments, today);

        self.index_instrument =
            resolver::resolve_index(&catalog, &self.config.index_tradingsymbol).cloned();
        match &self.index_instrument {
            Some(index) => info!(
                tradingsymbol = %index.tradingsymbol,
                token = index.instrument_token,
                "index instrument resolved"
            ),
            None => error!(
                tradingsymbol = %self.config.index_tradingsymbol,
                "index instrument not found, index change tracking disabled"
            ),
        }

        info!(instruments = catalog.len(), loaded_on = %today, "instrument catalog loaded");
        self.catalog = Some(catalog);
        Ok(())
    }

    async fn ensure_catalog(&mut self, today: NaiveDate) -> Result<()> {
        if self.catalog.as_ref().is_none_or(|c| c.is_stale(today)) {
            self.refresh_catalog(today).await?;
        }
        Ok(())
    }

    /// Run one polling cycle as of `now`.
    ///
    /// Missing contracts and empty history degrade to placeholder cells. A
    /// missing index quote skips the cycle. Data-source errors are returned.
    pub async fn run_cycle(&mut self, now: NaiveDateTime) -> Result<CycleOutcome> {
        self.ensure_catalog(now.date()).await?;

        let Some(index_price) = self.index_price().await? else {
            warn!(symbol = %self.config.index_symbol, "index quote unavailable, skipping cycle");
            return Ok(CycleOutcome::Skipped {
                at: now,
                reason: format!("no quote for {}", self.config.index_symbol),
            });
        };

        let ladder = ladder::build_ladder(
            index_price,
            self.config.strike_increment,
            self.config.strikes_to_track,
        );
        let atm_strike = ladder::atm_strike(index_price, self.config.strike_increment);
        debug!(index_price, ?atm_strike, strikes = ladder.len(), "strike ladder built");

        let catalog = self
            .catalog
            .as_ref()
            .context("Instrument catalog not loaded")?;

        let tally = AbnormalTally::default();
        let (calls, tally) = self
            .side_rows(catalog, OptionKind::Call, &ladder, now, tally)
            .await?;
        let (puts, tally) = self
            .side_rows(catalog, OptionKind::Put, &ladder, now, tally)
            .await?;

        let index = IndexSummary {
            current_price: index_price,
            cells: self.index_changes(index_price, now).await?,
        };

        let total_cells = ladder.len() * self.config.time_intervals.len();
        let alert = rules::evaluate_alert(tally, total_cells, self.config.alert_threshold_percentage);
        self.sink.notify(&alert);

        Ok(CycleOutcome::Completed(CycleReport {
            at: now,
            index_price,
            atm_strike,
            ladder,
            windows: self.config.time_intervals.clone(),
            calls,
            puts,
            index,
            alert,
        }))
    }

    async fn index_price(&self) -> Result<Option<f64>> {
        let symbol = self.config.index_symbol.as_str();
        let quotes = self
            .market
            .quote(&[symbol])
            .await
            .context("Failed to fetch index quote")?;

        Ok(quotes
            .get(symbol)
            .map(|q| q.last_price)
            .filter(|p| p.is_finite()))
    }

    async fn side_rows(
        &self,
        catalog: &InstrumentCatalog,
        kind: OptionKind,
        ladder: &[f64],
        now: NaiveDateTime,
        mut tally: AbnormalTally,
    ) -> Result<(Vec<OiRow>, AbnormalTally)> {
        let mut rows = Vec::with_capacity(ladder.len());

        for &strike in ladder {
            let Some(instrument) = resolver::resolve(
                catalog,
                &self.config.symbol_initials,
                kind,
                strike,
                now.date(),
            ) else {
                debug!(strike, side = kind.code(), "no contract for strike, skipping");
                continue;
            };

            let (row, next) = self.strike_row(instrument, kind, strike, now, tally).await?;
            tally = next;
            rows.push(row);
        }

        Ok((rows, tally))
    }

    async fn strike_row(
        &self,
        instrument: &Instrument,
        kind: OptionKind,
        strike: f64,
        now: NaiveDateTime,
        mut tally: AbnormalTally,
    ) -> Result<(OiRow, AbnormalTally)> {
        let token = instrument.instrument_token;
        let current_oi = self.current_oi(token, now).await?;
        if current_oi.is_none() {
            debug!(tradingsymbol = %instrument.tradingsymbol, "current OI unavailable");
        }

        let mut cells = Vec::with_capacity(self.config.time_intervals.len());
        for &minutes in &self.config.time_intervals {
            let Some(current) = current_oi else {
                cells.push(processor::oi_cell(minutes, None, false));
                continue;
            };

            let past = self.past_oi(token, now, minutes).await?;
            let delta = processor::oi_delta(current, past);
            let threshold = rules::threshold_for(&self.config, minutes, kind);
            let (abnormal, next) = rules::classify(tally, kind, delta.percentage, threshold);
            tally = next;
            cells.push(processor::oi_cell(minutes, Some(delta), abnormal));
        }

        let row = OiRow {
            strike,
            tradingsymbol: instrument.tradingsymbol.clone(),
            instrument_token: token,
            current_oi,
            cells,
        };
        Ok((row, tally))
    }

    /// OI of the latest bar in the last minute
    async fn current_oi(&self, token: u64, now: NaiveDateTime) -> Result<Option<i64>> {
        let from = now - TimeDelta::minutes(SAMPLE_SPAN_MINUTES);
        let candles = self
            .market
            .historical(token, from, now, &self.config.historical_data_interval, true)
            .await
            .with_context(|| format!("Failed to fetch current OI for token {}", token))?;

        Ok(candles.last().and_then(|c| c.oi))
    }

    /// OI of the first bar starting `minutes` ago, 0 if there is none
    async fn past_oi(&self, token: u64, now: NaiveDateTime, minutes: u32) -> Result<i64> {
        let from = now - TimeDelta::minutes(i64::from(minutes));
        let to = from + TimeDelta::minutes(SAMPLE_SPAN_MINUTES);
        let candles = self
            .market
            .historical(token, from, to, &self.config.historical_data_interval, true)
            .await
            .with_context(|| format!("Failed to fetch {}m OI for token {}", minutes, token))?;

        Ok(candles.first().and_then(|c| c.oi).unwrap_or(0))
    }

    /// Index price change over every window; informational only
    pub async fn index_changes(
        &self,
        current_price: f64,
        now: NaiveDateTime,
    ) -> Result<Vec<IndexCell>> {
        let windows = &self.config.time_intervals;
        let Some(index) = &self.index_instrument else {
            return Ok(processor::unavailable_index_cells(windows));
        };

        let mut cells = Vec::with_capacity(windows.len());
        for &minutes in windows {
            let from = now - TimeDelta::minutes(i64::from(minutes));
            let to = from + TimeDelta::minutes(SAMPLE_SPAN_MINUTES);
            let candles = self
                .market
                .historical(
                    index.instrument_token,
                    from,
                    to,
                    &self.config.historical_data_interval,
                    false,
                )
                .await
                .with_context(|| format!("Failed to fetch {}m index history", minutes))?;

            let past_price = candles.first().map(|c| c.close).unwrap_or(0.0);
            cells.push(processor::index_cell(
                minutes,
                processor::index_change(current_price, past_price),
            ));
        }

        Ok(cells)
    }
}
