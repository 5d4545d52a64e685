use super::config;
use super::error::KiteError;
use crate::tracker::models::{Candle, Instrument, OptionKind};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

/// Every Kite JSON response is wrapped in this envelope
#[derive(Debug, Deserialize)]
pub struct KiteEnvelope<T> {
    pub status: String,

    pub data: Option<T>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteEntry {
    #[serde(default)]
    pub instrument_token: Option<u64>,

    pub last_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalData {
    pub candles: Vec<Vec<Value>>,
}

/// One line of the instruments CSV dump; unused columns are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRow {
    pub instrument_token: u64,
    pub tradingsymbol: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub expiry: String,

    #[serde(default)]
    pub strike: f64,

    pub instrument_type: String,
}

impl CatalogRow {
    pub fn into_instrument(self) -> Instrument {
        let option_type = OptionKind::from_code(&self.instrument_type);
        let expiry = NaiveDate::parse_from_str(self.expiry.trim(), config::KITE_EXPIRY_FORMAT).ok();
        let strike = (option_type.is_some() && self.strike > 0.0).then_some(self.strike);

        Instrument {
            instrument_token: self.instrument_token,
            tradingsymbol: self.tradingsymbol,
            name: self.name,
            option_type,
            strike,
            expiry,
        }
    }
}

pub fn parse_instruments_csv(text: &str) -> Result<Vec<Instrument>, KiteError> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    reader
        .deserialize::<CatalogRow>()
        .map(|row| row.map(CatalogRow::into_instrument).map_err(KiteError::from))
        .collect()
}

/// Parse `[timestamp, open, high, low, close, volume, oi?]`
pub fn parse_candle(row: &[Value]) -> Result<Candle, KiteError> {
    let ts = row
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| KiteError::Parse(format!("candle without timestamp: {:?}", row)))?;
    let timestamp = DateTime::parse_from_str(ts, config::KITE_CANDLE_TIME_FORMAT)
        .map_err(|e| KiteError::Parse(format!("bad candle timestamp '{}': {}", ts, e)))?
        .naive_local();

    let close = row
        .get(4)
        .and_then(Value::as_f64)
        .ok_or_else(|| KiteError::Parse(format!("candle without close: {:?}", row)))?;

    let oi = row
        .get(6)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)));

    Ok(Candle { timestamp, close, oi })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CSV: &str = "\
instrument_token,exchange_token,tradingsymbol,name,last_price,expiry,strike,tick_size,lot_size,instrument_type,segment,exchange
256265,1001,NIFTY 50,NIFTY 50,0,,0,0,0,EQ,INDICES,NSE
12001,46,NIFTY25D0926000CE,\"NIFTY\",0,2025-12-09,26000,0.05,75,CE,NFO-OPT,NFO
12002,47,NIFTY25D0926000PE,\"NIFTY\",0,2025-12-09,26000.0,0.05,75,PE,NFO-OPT,NFO
13001,48,NIFTY25DECFUT,\"NIFTY\",0,2025-12-30,0,0.1,75,FUT,NFO-FUT,NFO
";

    #[test]
    fn test_parse_instruments_csv() {
        let instruments = parse_instruments_csv(CSV).unwrap();
        assert_eq!(instruments.len(), 4);

        let index = &instruments[0];
        assert_eq!(index.tradingsymbol, "NIFTY 50");
        assert_eq!(index.option_type, None);
        assert_eq!(index.strike, None);
        assert_eq!(index.expiry, None);

        let call = &instruments[1];
        assert_eq!(call.name, "NIFTY");
        assert_eq!(call.option_type, Some(OptionKind::Call));
        assert_eq!(call.strike, Some(26000.0));
        assert_eq!(call.expiry, NaiveDate::from_ymd_opt(2025, 12, 9));

        assert_eq!(instruments[2].option_type, Some(OptionKind::Put));

        let future = &instruments[3];
        assert_eq!(future.option_type, None);
        assert_eq!(future.strike, None);
    }

    #[test]
    fn test_parse_candle_with_oi() {
        let row = vec![
            json!("2025-12-01T10:15:00+0530"),
            json!(101.0),
            json!(104.5),
            json!(99.0),
            json!(102.25),
            json!(15000),
            json!(842100),
        ];
        let candle = parse_candle(&row).unwrap();
        assert_eq!(candle.close, 102.25);
        assert_eq!(candle.oi, Some(842100));
        assert_eq!(candle.timestamp.format("%H:%M").to_string(), "10:15");
    }

    #[test]
    fn test_parse_candle_without_oi() {
        let row = vec![
            json!("2025-12-01T10:15:00+0530"),
            json!(26010.0),
            json!(26020.0),
            json!(26000.0),
            json!(26012.5),
            json!(0),
        ];
        let candle = parse_candle(&row).unwrap();
        assert_eq!(candle.oi, None);
    }

    #[test]
    fn test_parse_candle_rejects_garbage() {
        assert!(parse_candle(&[json!(12)]).is_err());
        assert!(parse_candle(&[json!("yesterday"), json!(1), json!(1), json!(1), json!(1)]).is_err());
    }

    #[test]
    fn test_error_envelope() {
        let body = r#"{"status":"error","message":"Incorrect api_key or access_token.","error_type":"TokenException"}"#;
        let env: KiteEnvelope<HistoricalData> = serde_json::from_str(body).unwrap();
        assert_eq!(env.status, "error");
        assert!(env.data.is_none());
        assert_eq!(env.error_type.as_deref(), Some("TokenException"));
    }
}
