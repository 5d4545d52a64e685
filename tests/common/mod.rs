#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use oi_tracker::tracker::{
    AlertSink, AlertSummary, Candle, Instrument, MarketData, OptionKind, Quote,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const INDEX_SYMBOL: &str = "NSE:NIFTY 50";
pub const INDEX_TOKEN: u64 = 256265;
pub const LADDER: [f64; 5] = [19700.0, 19750.0, 19800.0, 19850.0, 19900.0];

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn option(token: u64, kind: OptionKind, strike: f64, expiry: NaiveDate) -> Instrument {
    Instrument {
        instrument_token: token,
        tradingsymbol: format!("NIFTY{}{}{}", expiry.format("%y%b").to_string().to_uppercase(), strike, kind.code()),
        name: "NIFTY".to_string(),
        option_type: Some(kind),
        strike: Some(strike),
        expiry: Some(expiry),
    }
}

pub fn index_instrument() -> Instrument {
    Instrument {
        instrument_token: INDEX_TOKEN,
        tradingsymbol: "NIFTY 50".to_string(),
        name: "NIFTY 50".to_string(),
        option_type: None,
        strike: None,
        expiry: None,
    }
}

pub fn call_token(i: usize) -> u64 {
    1000 + i as u64
}

pub fn put_token(i: usize) -> u64 {
    2000 + i as u64
}

/// Scripted data source keyed by token and window.
///
/// A request ending at `now` is a current-OI lookup; any other request is a
/// past lookup for the window `now - from`.
pub struct FakeMarket {
    pub now: NaiveDateTime,
    pub instruments: Vec<Instrument>,
    pub quotes: HashMap<String, f64>,
    pub oi_now: HashMap<u64, i64>,
    pub oi_past: HashMap<(u64, u32), i64>,
    pub index_past: HashMap<u32, f64>,
    pub quote_failures_left: AtomicUsize,
    pub instrument_calls: AtomicUsize,
    pub historical_calls: AtomicUsize,
}

impl FakeMarket {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            instruments: Vec::new(),
            quotes: HashMap::new(),
            oi_now: HashMap::new(),
            oi_past: HashMap::new(),
            index_past: HashMap::new(),
            quote_failures_left: AtomicUsize::new(0),
            instrument_calls: AtomicUsize::new(0),
            historical_calls: AtomicUsize::new(0),
        }
    }

    /// NIFTY at 19820 with weekly contracts on every ladder strike,
    /// flat OI of 1000 and the index at 19800 in every window.
    pub fn nifty_chain(now: NaiveDateTime) -> Self {
        let mut market = Self::new(now);
        let weekly = now.date() + chrono::Days::new(2);

        market.instruments.push(index_instrument());
        for (i, &strike) in LADDER.iter().enumerate() {
            market.instruments.push(option(call_token(i), OptionKind::Call, strike, weekly));
            market.instruments.push(option(put_token(i), OptionKind::Put, strike, weekly));
            market.oi_now.insert(call_token(i), 1000);
            market.oi_now.insert(put_token(i), 1000);
            for window in [5, 10, 15, 30] {
                market.oi_past.insert((call_token(i), window), 1000);
                market.oi_past.insert((put_token(i), window), 1000);
            }
        }
        for window in [5, 10, 15, 30] {
            market.index_past.insert(window, 19800.0);
        }
        market.quotes.insert(INDEX_SYMBOL.to_string(), 19820.0);
        market
    }

    pub fn failing_quotes(self, count: usize) -> Self {
        self.quote_failures_left.store(count, Ordering::SeqCst);
        self
    }

    fn candle(&self, timestamp: NaiveDateTime, close: f64, oi: Option<i64>) -> Vec<Candle> {
        vec![Candle { timestamp, close, oi }]
    }
}

#[async_trait]
impl MarketData for FakeMarket {
    async fn quote(&self, symbols: &[&str]) -> Result<HashMap<String, Quote>> {
        let failing = self
            .quote_failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(anyhow!("connection reset by peer"));
        }

        Ok(symbols
            .iter()
            .filter_map(|s| {
                self.quotes
                    .get(*s)
                    .map(|&last_price| (s.to_string(), Quote { last_price }))
            })
            .collect())
    }

    async fn historical(
        &self,
        instrument_token: u64,
        from: NaiveDateTime,
        to: NaiveDateTime,
        _interval: &str,
        include_oi: bool,
    ) -> Result<Vec<Candle>> {
        self.historical_calls.fetch_add(1, Ordering::SeqCst);

        if to == self.now {
            return Ok(match self.oi_now.get(&instrument_token) {
                Some(&oi) if include_oi => self.candle(from, 0.0, Some(oi)),
                _ => Vec::new(),
            });
        }

        let Ok(window) = u32::try_from((self.now - from).num_minutes()) else {
            return Ok(Vec::new());
        };
        if instrument_token == INDEX_TOKEN {
            return Ok(match self.index_past.get(&window) {
                Some(&close) => self.candle(from, close, None),
                None => Vec::new(),
            });
        }
        Ok(match self.oi_past.get(&(instrument_token, window)) {
            Some(&oi) if include_oi => self.candle(from, 0.0, Some(oi)),
            _ => Vec::new(),
        })
    }

    async fn instruments(&self) -> Result<Vec<Instrument>> {
        self.instrument_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.instruments.clone())
    }
}

/// Keeps every alert summary it is handed
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub seen: Arc<Mutex<Vec<AlertSummary>>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<AlertSummary> {
        self.seen.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    fn notify(&self, summary: &AlertSummary) {
        self.seen.lock().unwrap().push(summary.clone());
    }
}
