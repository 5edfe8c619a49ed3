//! Errors from the context fetcher and its HTTP collaborators.

use regimelab_core::data::DataError;
use thiserror::Error;

use crate::schema::SchemaError;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("circuit breaker open, retry in {remaining_secs}s")]
    CircuitOpen { remaining_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("invalid payload: {0}")]
    Schema(#[from] SchemaError),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("unsupported timeframe '{0}'")]
    UnsupportedTimeframe(String),

    #[error("no candles returned for '{symbol}'")]
    NoCandles { symbol: String },

    #[error("candle window rejected: {0}")]
    Data(#[from] DataError),
}

impl FetchError {
    /// Network-level failures (connect, timeout, 5xx) that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::RateLimited { .. } => true,
            FetchError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return FetchError::ResponseFormat(e.to_string());
        }
        match e.status() {
            Some(status) => FetchError::Status {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => FetchError::Network(e.to_string()),
        }
    }
}
