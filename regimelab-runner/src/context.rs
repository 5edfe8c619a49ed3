//! Context fetcher: the fallback chain that produces a [`MarketContext`].
//!
//! Order of resolution for `(symbol, timeframe)`:
//! 1. Cache hit → the cached context, marked `cached`
//! 2. Backend analysis `ok` → source `backend`
//! 3. Backend `error` or transport failure → error (the backend is the
//!    authority; no candle fallback)
//! 4. Backend `insufficient_data` → fetch candles from the provider and
//!    validate the window
//! 5. Ephemeral analysis `ok` → source `ephemeral`
//! 6. Any ephemeral failure → local indicator engine → source `client`
//!
//! Successful contexts are cached.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use regimelab_core::data::validate_window;
use regimelab_core::fingerprint::window_hash;
use regimelab_core::{
    Candle, IndicatorEngine, IndicatorSnapshot, MarketState, TrendDirection, VolatilityRegime,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{AnalysisBackend, HttpBackend};
use crate::cache::{AnalysisCache, CacheKey};
use crate::circuit_breaker::CircuitBreaker;
use crate::config::FetcherConfig;
use crate::error::FetchError;
use crate::provider::{BinanceProvider, CandleProvider};
use crate::schema::{AnalysisResponse, BackendAnalysis, EphemeralResponse, Forecast};

/// Where a context's regime came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    Backend,
    Ephemeral,
    Client,
}

impl std::fmt::Display for ContextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ContextSource::Backend => "backend",
            ContextSource::Ephemeral => "ephemeral",
            ContextSource::Client => "client",
        })
    }
}

/// Regime fields common to every source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeView {
    pub market_state: MarketState,
    pub volatility_regime: VolatilityRegime,
    pub trend_direction: TrendDirection,
    pub trend_strength: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
}

impl From<&BackendAnalysis> for RegimeView {
    fn from(a: &BackendAnalysis) -> Self {
        Self {
            market_state: a.market_state,
            volatility_regime: a.volatility_regime,
            trend_direction: a.trend_direction,
            trend_strength: a.trend_strength,
            confidence: a.confidence,
            forecast: a.forecast.clone(),
        }
    }
}

impl From<&IndicatorSnapshot> for RegimeView {
    fn from(s: &IndicatorSnapshot) -> Self {
        Self {
            market_state: s.market_state,
            volatility_regime: s.volatility_regime,
            trend_direction: s.trend_direction,
            trend_strength: s.trend_strength,
            confidence: None,
            forecast: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub symbol: String,
    pub timeframe: String,
    pub source: ContextSource,
    pub latency_ms: u64,
    pub fetched_at: DateTime<Utc>,
    /// BLAKE3 of the candle window, when candles were fetched.
    pub candles_hash: Option<String>,
    pub regime: RegimeView,
    /// Full indicator snapshot, present for `client` contexts.
    pub snapshot: Option<IndicatorSnapshot>,
    #[serde(default)]
    pub cached: bool,
}

pub struct ContextFetcher {
    backend: Arc<dyn AnalysisBackend>,
    provider: Arc<dyn CandleProvider>,
    cache: Arc<AnalysisCache<MarketContext>>,
    engine: IndicatorEngine,
    candle_limit: usize,
}

impl ContextFetcher {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        provider: Arc<dyn CandleProvider>,
        cache: Arc<AnalysisCache<MarketContext>>,
        engine: IndicatorEngine,
        candle_limit: usize,
    ) -> Self {
        Self {
            backend,
            provider,
            cache,
            engine,
            candle_limit,
        }
    }

    /// HTTP backend, Binance provider and a fresh cache, all from `config`.
    pub fn from_config(config: &FetcherConfig) -> Result<Self, FetchError> {
        let backend = HttpBackend::new(&config.backend)?;
        let breaker = Arc::new(CircuitBreaker::default_provider());
        let provider = BinanceProvider::new(&config.market_data, breaker)?;
        Ok(Self::new(
            Arc::new(backend),
            Arc::new(provider),
            Arc::new(AnalysisCache::from_config(&config.cache)),
            IndicatorEngine::new(config.engine.clone()),
            config.market_data.candle_limit,
        ))
    }

    pub fn cache(&self) -> &Arc<AnalysisCache<MarketContext>> {
        &self.cache
    }

    pub fn fetch(&self, symbol: &str, timeframe: &str) -> Result<MarketContext, FetchError> {
        let symbol = symbol.trim().to_ascii_uppercase();
        let key = CacheKey::new(&symbol, timeframe);

        if let Some(mut ctx) = self.cache.get(&key) {
            debug!(symbol = %symbol, timeframe, source = %ctx.source, "context cache hit");
            ctx.cached = true;
            return Ok(ctx);
        }

        let started = Instant::now();
        let ctx = match self.backend.analyze(&symbol, timeframe)? {
            AnalysisResponse::Ok { analysis } => self.finish(
                &symbol,
                timeframe,
                ContextSource::Backend,
                started,
                RegimeView::from(&analysis),
                None,
                None,
            ),
            AnalysisResponse::Error { message } => {
                warn!(symbol = %symbol, timeframe, %message, "backend analysis failed");
                return Err(FetchError::Backend(message));
            }
            AnalysisResponse::InsufficientData {
                available_bars,
                required_bars,
            } => {
                info!(
                    symbol = %symbol,
                    timeframe,
                    available_bars,
                    required_bars,
                    "backend has insufficient data, fetching candles"
                );
                self.from_candles(&symbol, timeframe, started)?
            }
        };

        info!(
            symbol = %symbol,
            timeframe,
            source = %ctx.source,
            latency_ms = ctx.latency_ms,
            "market context resolved"
        );
        self.cache.insert(key, ctx.clone());
        Ok(ctx)
    }

    /// Resolve many contexts in parallel. Results keep the request order.
    pub fn fetch_many(
        &self,
        requests: &[(String, String)],
    ) -> Vec<Result<MarketContext, FetchError>> {
        requests
            .par_iter()
            .map(|(symbol, timeframe)| self.fetch(symbol, timeframe))
            .collect()
    }

    fn from_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        started: Instant,
    ) -> Result<MarketContext, FetchError> {
        let candles = self
            .provider
            .fetch_candles(symbol, timeframe, self.candle_limit)?;
        validate_window(&candles)?;
        let hash = window_hash(&candles);

        match self.backend.analyze_ephemeral(symbol, timeframe, &candles) {
            Ok(EphemeralResponse::Ok { analysis }) => {
                return Ok(self.finish(
                    symbol,
                    timeframe,
                    ContextSource::Ephemeral,
                    started,
                    RegimeView::from(&analysis),
                    Some(hash),
                    None,
                ));
            }
            Ok(EphemeralResponse::Error { message }) => {
                warn!(
                    symbol,
                    timeframe,
                    %message,
                    "ephemeral analysis rejected, using local engine"
                );
            }
            Err(e) => {
                warn!(
                    symbol,
                    timeframe,
                    error = %e,
                    "ephemeral analysis failed, using local engine"
                );
            }
        }

        Ok(self.local(symbol, timeframe, started, &candles, hash))
    }

    fn local(
        &self,
        symbol: &str,
        timeframe: &str,
        started: Instant,
        candles: &[Candle],
        hash: String,
    ) -> MarketContext {
        let snapshot = self.engine.snapshot(candles);
        self.finish(
            symbol,
            timeframe,
            ContextSource::Client,
            started,
            RegimeView::from(&snapshot),
            Some(hash),
            Some(snapshot),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        symbol: &str,
        timeframe: &str,
        source: ContextSource,
        started: Instant,
        regime: RegimeView,
        candles_hash: Option<String>,
        snapshot: Option<IndicatorSnapshot>,
    ) -> MarketContext {
        MarketContext {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            source,
            latency_ms: started.elapsed().as_millis() as u64,
            fetched_at: Utc::now(),
            candles_hash,
            regime,
            snapshot,
            cached: false,
        }
    }
}
