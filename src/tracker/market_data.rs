use super::models::{Candle, Instrument, Quote};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;

/// Market data the tracker needs from a broker.
///
/// Errors are returned as-is; the tracker never retries them within a cycle.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Latest quotes keyed by the requested symbol
    async fn quote(&self, symbols: &[&str]) -> Result<HashMap<String, Quote>>;

    /// Candles in `[from, to]`, oldest first. An empty range is not an error.
    async fn historical(
        &self,
        instrument_token: u64,
        from: NaiveDateTime,
        to: NaiveDateTime,
        interval: &str,
        include_oi: bool,
    ) -> Result<Vec<Candle>>;

    /// Full instrument catalog
    async fn instruments(&self) -> Result<Vec<Instrument>>;
}

#[async_trait]
impl<T: MarketData + ?Sized> MarketData for Arc<T> {
    async fn quote(&self, symbols: &[&str]) -> Result<HashMap<String, Quote>> {
        (**self).quote(symbols).await
    }

    async fn historical(
        &self,
        instrument_token: u64,
        from: NaiveDateTime,
        to: NaiveDateTime,
        interval: &str,
        include_oi: bool,
    ) -> Result<Vec<Candle>> {
        (**self)
            .historical(instrument_token, from, to, interval, include_oi)
            .await
    }

    async fn instruments(&self) -> Result<Vec<Instrument>> {
        (**self).instruments().await
    }
}
