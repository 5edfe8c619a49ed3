//! Market-data providers.
//!
//! [`CandleProvider`] is the seam the context fetcher depends on;
//! [`BinanceProvider`] implements it against Binance's public
//! `GET /api/v3/klines` endpoint. Retries with exponential backoff on
//! transient failures, guarded by a [`CircuitBreaker`].

use std::sync::Arc;
use std::time::Duration;

use regimelab_core::Candle;
use serde_json::Value;
use tracing::{debug, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::MarketDataConfig;
use crate::error::FetchError;

/// Kline intervals accepted by the exchange.
pub const TIMEFRAMES: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w", "1M",
];

/// Binance caps a single klines request at 1000 candles.
pub const MAX_KLINES_LIMIT: usize = 1000;

pub fn is_supported_timeframe(timeframe: &str) -> bool {
    TIMEFRAMES.contains(&timeframe)
}

/// Source of recent candles for a symbol.
pub trait CandleProvider: Send + Sync {
    fn name(&self) -> &str;

    /// The most recent `limit` candles, ascending by open time.
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError>;
}

pub struct BinanceProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl BinanceProvider {
    pub fn new(
        config: &MarketDataConfig,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("regimelab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            circuit_breaker,
            max_retries: 2,
            base_delay: Duration::from_millis(250),
        })
    }

    /// Override the retry policy (tests use zero delay).
    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    pub fn klines_url(&self, symbol: &str, timeframe: &str, limit: usize) -> String {
        format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            symbol.to_ascii_uppercase(),
            timeframe,
            limit.clamp(1, MAX_KLINES_LIMIT)
        )
    }

    fn guard(&self) -> Result<(), FetchError> {
        if self.circuit_breaker.is_allowed() {
            Ok(())
        } else {
            Err(FetchError::CircuitOpen {
                remaining_secs: self.circuit_breaker.remaining_cooldown().as_secs(),
            })
        }
    }

    fn fetch_once(&self, url: &str) -> Result<Vec<Candle>, FetchError> {
        let resp = self.client.get(url).send().map_err(|e| {
            self.circuit_breaker.record_failure();
            FetchError::from(e)
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.circuit_breaker.record_status(status.as_u16());
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(FetchError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            self.circuit_breaker.record_status(status.as_u16());
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body: Value = resp.json()?;
        let candles = parse_klines(&body)?;
        self.circuit_breaker.record_success();
        Ok(candles)
    }
}

impl CandleProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance"
    }

    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError> {
        if !is_supported_timeframe(timeframe) {
            return Err(FetchError::UnsupportedTimeframe(timeframe.to_string()));
        }
        self.guard()?;

        let url = self.klines_url(symbol, timeframe, limit);
        let mut attempt = 0;
        loop {
            match self.fetch_once(&url) {
                Ok(candles) if candles.is_empty() => {
                    return Err(FetchError::NoCandles {
                        symbol: symbol.to_string(),
                    })
                }
                Ok(candles) => {
                    debug!(symbol, timeframe, count = candles.len(), "fetched klines");
                    return Ok(candles);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(symbol, timeframe, attempt, error = %e, "kline fetch failed, retrying");
                    std::thread::sleep(self.base_delay * 2u32.pow(attempt - 1));
                    self.guard()?;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Parse a klines payload: an array of
/// `[open_time, "open", "high", "low", "close", "volume", close_time, ...]`.
pub fn parse_klines(body: &Value) -> Result<Vec<Candle>, FetchError> {
    let rows = body
        .as_array()
        .ok_or_else(|| FetchError::ResponseFormat("klines payload is not an array".into()))?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let fields = row
                .as_array()
                .filter(|f| f.len() >= 6)
                .ok_or_else(|| FetchError::ResponseFormat(format!("kline {i} is malformed")))?;
            let timestamp = fields[0]
                .as_i64()
                .ok_or_else(|| FetchError::ResponseFormat(format!("kline {i} has no open time")))?;
            let num = |idx: usize| number_field(&fields[idx], i);
            Ok(Candle {
                timestamp,
                open: num(1)?,
                high: num(2)?,
                low: num(3)?,
                close: num(4)?,
                volume: num(5)?,
            })
        })
        .collect()
}

/// Prices arrive as decimal strings; plain numbers are accepted too.
fn number_field(value: &Value, row: usize) -> Result<f64, FetchError> {
    match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| FetchError::ResponseFormat(format!("kline {row} has a non-numeric field")))
}
