use chrono::NaiveDateTime;
use std::time::Duration;

// -----------------------------------------------
// KITE CONNECT ENDPOINTS
// -----------------------------------------------
pub const KITE_BASE_URL: &str = "https://api.kite.trade";
pub const KITE_API_VERSION: &str = "3";

/// Request timestamps, interpreted by Kite as exchange local time
pub const KITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Candle timestamps, e.g. "2025-12-01T09:15:00+0530"
pub const KITE_CANDLE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Catalog expiry column
pub const KITE_EXPIRY_FORMAT: &str = "%Y-%m-%d";

pub fn kite_quote_url(base_url: &str, symbols: &[&str]) -> String {
    let query: Vec<String> = symbols
        .iter()
        .map(|s| format!("i={}", urlencoding::encode(s)))
        .collect();
    format!("{}/quote?{}", base_url, query.join("&"))
}

pub fn kite_instruments_url(base_url: &str) -> String {
    format!("{}/instruments", base_url)
}

pub fn kite_historical_url(
    base_url: &str,
    instrument_token: u64,
    interval: &str,
    from: NaiveDateTime,
    to: NaiveDateTime,
    include_oi: bool,
) -> String {
    format!(
        "{}/instruments/historical/{}/{}?from={}&to={}&oi={}",
        base_url,
        instrument_token,
        urlencoding::encode(interval),
        urlencoding::encode(&from.format(KITE_DATETIME_FORMAT).to_string()),
        urlencoding::encode(&to.format(KITE_DATETIME_FORMAT).to_string()),
        u8::from(include_oi)
    )
}

// -----------------------------------------------
// CREDENTIALS (obtained outside this tool)
// -----------------------------------------------
pub const ENV_API_KEY: &str = "KITE_API_KEY";
pub const ENV_ACCESS_TOKEN: &str = "KITE_ACCESS_TOKEN";
pub const ENV_BASE_URL: &str = "KITE_BASE_URL";

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = concat!("oi-tracker/", env!("CARGO_PKG_VERSION"));

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-IN,en;q=0.9",
];

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

// -----------------------------------------------
// RETRY CONFIG (429 / 5xx / transport errors only)
// -----------------------------------------------
pub const RETRY_BASE_DELAY_MS: u64 = 100;
pub const RETRY_FACTOR: u64 = 2;
pub const RETRY_MAX_DELAY_SECS: u64 = 3;
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// -----------------------------------------------
// LOGGING
// -----------------------------------------------
pub const BODY_PREVIEW_CHARS: usize = 200;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_quote_url_encodes_symbols() {
        let url = kite_quote_url(KITE_BASE_URL, &["NSE:NIFTY 50", "NSE:NIFTY BANK"]);
        assert_eq!(
            url,
            "https://api.kite.trade/quote?i=NSE%3ANIFTY%2050&i=NSE%3ANIFTY%20BANK"
        );
    }

    #[test]
    fn test_historical_url() {
        let from = NaiveDate::from_ymd_opt(2025, 12, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let to = from + chrono::TimeDelta::minutes(1);
        let url = kite_historical_url(KITE_BASE_URL, 12345, "minute", from, to, true);
        assert_eq!(
            url,
            "https://api.kite.trade/instruments/historical/12345/minute\
             ?from=2025-12-01%2010%3A00%3A00&to=2025-12-01%2010%3A01%3A00&oi=1"
        );
    }
}
