use super::config;
use super::error::KiteError;
use super::models::{parse_candle, parse_instruments_csv, HistoricalData, KiteEnvelope, QuoteEntry};
use crate::tracker::market_data::MarketData;
use crate::tracker::models::{Candle, Instrument, Quote};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;
use tracing::{debug, warn};

// -----------------------------------------------
// CREDENTIALS
// -----------------------------------------------
#[derive(Clone)]
pub struct KiteCredentials {
    api_key: String,
    access_token: String,
}

impl KiteCredentials {
    pub fn new(api_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_env() -> Result<Self, KiteError> {
        let api_key = std::env::var(config::ENV_API_KEY)
            .map_err(|_| KiteError::MissingCredentials(config::ENV_API_KEY))?;
        let access_token = std::env::var(config::ENV_ACCESS_TOKEN)
            .map_err(|_| KiteError::MissingCredentials(config::ENV_ACCESS_TOKEN))?;
        Ok(Self::new(api_key, access_token))
    }

    fn authorization(&self) -> String {
        format!("token {}:{}", self.api_key, self.access_token)
    }
}

// -----------------------------------------------
// CLIENT
// -----------------------------------------------
pub struct KiteClient {
    client: Client,
    base_url: String,
    credentials: KiteCredentials,
}

fn preview(body: &str) -> String {
    body.chars().take(config::BODY_PREVIEW_CHARS).collect()
}

/// Turn a non-success response into a typed error, using the Kite envelope when present
fn api_error(status: StatusCode, body: &str) -> KiteError {
    match serde_json::from_str::<KiteEnvelope<serde_json::Value>>(body) {
        Ok(env) => KiteError::Api {
            status: status.as_u16(),
            error_type: env.error_type.unwrap_or_else(|| "UnknownError".to_string()),
            message: env.message.unwrap_or_else(|| preview(body)),
        },
        Err(_) => KiteError::Api {
            status: status.as_u16(),
            error_type: "HttpError".to_string(),
            message: preview(body),
        },
    }
}

fn unwrap_envelope<T: DeserializeOwned>(text: &str) -> Result<T, KiteError> {
    let env: KiteEnvelope<T> = serde_json::from_str(text)?;
    if env.status != "success" {
        return Err(KiteError::Api {
            status: 200,
            error_type: env.error_type.unwrap_or_else(|| "UnknownError".to_string()),
            message: env.message.unwrap_or_default(),
        });
    }
    env.data
        .ok_or_else(|| KiteError::Parse("success response without data".to_string()))
}

impl KiteClient {
    pub fn new(credentials: KiteCredentials) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: config::KITE_BASE_URL.to_string(),
            credentials,
        })
    }

    /// Credentials from `KITE_API_KEY` / `KITE_ACCESS_TOKEN`, base URL from `KITE_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let credentials = KiteCredentials::from_env()?;
        let client = Self::new(credentials)?;
        Ok(match std::env::var(config::ENV_BASE_URL) {
            Ok(url) if !url.trim().is_empty() => client.with_base_url(url),
            _ => client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_once(&self, url: &str) -> Result<String, KiteError> {
        let res = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, self.credentials.authorization())
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            warn!(url, status = status.as_u16(), "retryable response from Kite");
            return Err(KiteError::Retryable {
                status: status.as_u16(),
                preview: preview(&body),
            });
        }

        Err(api_error(status, &body))
    }

    /// GET with exponential backoff on rate limits and transient failures
    async fn fetch_text(&self, url: &str) -> Result<String, KiteError> {
        let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
            .factor(config::RETRY_FACTOR)
            .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
            .take(config::RETRY_MAX_ATTEMPTS);

        debug!(url, "kite request");
        RetryIf::spawn(backoff, || self.fetch_once(url), KiteError::is_retryable).await
    }

    async fn fetch_data<T: DeserializeOwned>(&self, url: &str) -> Result<T, KiteError> {
        let text = self.fetch_text(url).await?;
        unwrap_envelope(&text)
    }
}

#[async_trait]
impl MarketData for KiteClient {
    async fn quote(&self, symbols: &[&str]) -> Result<HashMap<String, Quote>> {
        let url = config::kite_quote_url(&self.base_url, symbols);
        let quotes: HashMap<String, QuoteEntry> = self
            .fetch_data(&url)
            .await
            .context("Failed to fetch quote")?;

        Ok(quotes
            .into_iter()
            .map(|(symbol, q)| (symbol, Quote { last_price: q.last_price }))
            .collect())
    }

    async fn historical(
        &self,
        instrument_token: u64,
        from: NaiveDateTime,
        to: NaiveDateTime,
        interval: &str,
        include_oi: bool,
    ) -> Result<Vec<Candle>> {
        let url = config::kite_historical_url(
            &self.base_url,
            instrument_token,
            interval,
            from,
            to,
            include_oi,
        );
        let data: HistoricalData = self
            .fetch_data(&url)
            .await
            .with_context(|| format!("Failed to fetch history for token {}", instrument_token))?;

        let candles = data
            .candles
            .iter()
            .map(|row| parse_candle(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(candles)
    }

    async fn instruments(&self) -> Result<Vec<Instrument>> {
        let url = config::kite_instruments_url(&self.base_url);
        let text = self
            .fetch_text(&url)
            .await
            .context("Failed to download instruments")?;
        let instruments = parse_instruments_csv(&text).context("Failed to parse instruments CSV")?;
        debug!(count = instruments.len(), "instruments parsed");
        Ok(instruments)
    }
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    let lang = config::ACCEPT_LANGUAGES
        .choose(&mut thread_rng())
        .copied()
        .unwrap_or("en-US,en;q=0.9");
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));
    headers.insert(
        "x-kite-version",
        header::HeaderValue::from_static(config::KITE_API_VERSION),
    );

    Client::builder()
        .default_headers(headers)
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}
