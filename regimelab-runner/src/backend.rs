//! Analysis backend client.
//!
//! - `GET {base}/api/analysis/{symbol}?timeframe={tf}` → [`AnalysisResponse`]
//! - `POST {base}/api/analysis/ephemeral` with the candle window → [`EphemeralResponse`]
//!
//! Tagged payloads are returned as-is, `insufficient_data` and `error`
//! included; deciding what to do with them is the fetcher's job. Transport
//! failures, payloads that fail validation, and non-2xx statuses (unless the
//! body is a tagged failure) are errors.

use std::time::Duration;

use regimelab_core::Candle;
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;
use crate::error::FetchError;
use crate::schema::{AnalysisResponse, EphemeralRequest, EphemeralResponse};

pub trait AnalysisBackend: Send + Sync {
    /// Stored-history analysis for a symbol.
    fn analyze(&self, symbol: &str, timeframe: &str) -> Result<AnalysisResponse, FetchError>;

    /// Analysis of a client-supplied candle window; nothing is persisted.
    fn analyze_ephemeral(
        &self,
        symbol: &str,
        timeframe: &str,
        candles: &[Candle],
    ) -> Result<EphemeralResponse, FetchError>;
}

pub struct HttpBackend {
    client: reqwest::blocking::Client,
    base_url: String,
    analysis_timeout: Duration,
    ephemeral_timeout: Duration,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("regimelab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            analysis_timeout: config.analysis_timeout(),
            ephemeral_timeout: config.ephemeral_timeout(),
        })
    }

    pub fn analysis_url(&self, symbol: &str, timeframe: &str) -> String {
        format!(
            "{}/api/analysis/{}?timeframe={}",
            self.base_url,
            symbol.to_ascii_uppercase(),
            timeframe
        )
    }

    pub fn ephemeral_url(&self) -> String {
        format!("{}/api/analysis/ephemeral", self.base_url)
    }

    fn decode<T: DeserializeOwned + Tagged>(
        resp: reqwest::blocking::Response,
        url: &str,
    ) -> Result<T, FetchError> {
        let status = resp.status();
        let text = resp.text()?;
        decode_body(status, &text, url)
    }
}

/// Tagged payloads that can report a successful analysis.
pub(crate) trait Tagged {
    fn is_ok(&self) -> bool;
}

impl Tagged for AnalysisResponse {
    fn is_ok(&self) -> bool {
        matches!(self, AnalysisResponse::Ok { .. })
    }
}

impl Tagged for EphemeralResponse {
    fn is_ok(&self) -> bool {
        matches!(self, EphemeralResponse::Ok { .. })
    }
}

/// Decode a response body. Error payloads are tagged JSON too, so a
/// non-2xx body that parses as `error` or `insufficient_data` is returned
/// as-is; an `ok` body or an unparseable one under a non-2xx status is a
/// status error.
pub(crate) fn decode_body<T: DeserializeOwned + Tagged>(
    status: reqwest::StatusCode,
    text: &str,
    url: &str,
) -> Result<T, FetchError> {
    let status_error = || FetchError::Status {
        status: status.as_u16(),
        url: url.to_string(),
    };
    match serde_json::from_str::<T>(text) {
        Ok(value) if !status.is_success() && value.is_ok() => Err(status_error()),
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(status_error()),
        Err(e) => Err(FetchError::ResponseFormat(format!("{url}: {e}"))),
    }
}

impl AnalysisBackend for HttpBackend {
    fn analyze(&self, symbol: &str, timeframe: &str) -> Result<AnalysisResponse, FetchError> {
        let url = self.analysis_url(symbol, timeframe);
        let resp = self
            .client
            .get(&url)
            .timeout(self.analysis_timeout)
            .send()?;
        let parsed: AnalysisResponse = Self::decode(resp, &url)?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn analyze_ephemeral(
        &self,
        symbol: &str,
        timeframe: &str,
        candles: &[Candle],
    ) -> Result<EphemeralResponse, FetchError> {
        let url = self.ephemeral_url();
        let body = EphemeralRequest {
            symbol,
            timeframe,
            candles,
        };
        let resp = self
            .client
            .post(&url)
            .timeout(self.ephemeral_timeout)
            .json(&body)
            .send()?;
        let parsed: EphemeralResponse = Self::decode(resp, &url)?;
        parsed.validate()?;
        Ok(parsed)
    }
}
