//! Integration tests for the context fallback chain, with stubbed
//! backend and provider so every branch is exercised without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use regimelab_core::data::synthetic;
use regimelab_core::{Candle, IndicatorEngine, MarketState, TrendDirection, VolatilityRegime};
use regimelab_runner::{
    AnalysisBackend, AnalysisCache, AnalysisResponse, BackendAnalysis, CandleProvider,
    ContextFetcher, ContextSource, EphemeralResponse, FetchError,
};

// ── Stubs ────────────────────────────────────────────────────────────

enum EphemeralBehavior {
    Ok,
    Rejects,
    Unreachable,
}

struct StubBackend {
    analysis: Result<AnalysisResponse, String>,
    ephemeral: EphemeralBehavior,
    analyze_calls: AtomicUsize,
    ephemeral_calls: AtomicUsize,
    last_ephemeral_len: AtomicUsize,
}

impl StubBackend {
    fn new(analysis: Result<AnalysisResponse, String>, ephemeral: EphemeralBehavior) -> Self {
        Self {
            analysis,
            ephemeral,
            analyze_calls: AtomicUsize::new(0),
            ephemeral_calls: AtomicUsize::new(0),
            last_ephemeral_len: AtomicUsize::new(0),
        }
    }
}

fn server_analysis() -> BackendAnalysis {
    BackendAnalysis {
        market_state: MarketState::Chop,
        volatility_regime: VolatilityRegime::High,
        trend_direction: TrendDirection::Sideways,
        trend_strength: 18.0,
        confidence: Some(0.7),
        forecast: None,
    }
}

impl AnalysisBackend for StubBackend {
    fn analyze(&self, _symbol: &str, _timeframe: &str) -> Result<AnalysisResponse, FetchError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        match &self.analysis {
            Ok(resp) => Ok(resp.clone()),
            Err(msg) => Err(FetchError::Network(msg.clone())),
        }
    }

    fn analyze_ephemeral(
        &self,
        _symbol: &str,
        _timeframe: &str,
        candles: &[Candle],
    ) -> Result<EphemeralResponse, FetchError> {
        self.ephemeral_calls.fetch_add(1, Ordering::SeqCst);
        self.last_ephemeral_len.store(candles.len(), Ordering::SeqCst);
        match self.ephemeral {
            EphemeralBehavior::Ok => Ok(EphemeralResponse::Ok {
                analysis: server_analysis(),
            }),
            EphemeralBehavior::Rejects => Ok(EphemeralResponse::Error {
                message: "model warming up".into(),
            }),
            EphemeralBehavior::Unreachable => Err(FetchError::Network("timed out".into())),
        }
    }
}

struct StubProvider {
    candles: Result<Vec<Candle>, String>,
    calls: AtomicUsize,
    last_limit: AtomicUsize,
}

impl StubProvider {
    fn with(candles: Vec<Candle>) -> Self {
        Self {
            candles: Ok(candles),
            calls: AtomicUsize::new(0),
            last_limit: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            candles: Err("exchange down".into()),
            calls: AtomicUsize::new(0),
            last_limit: AtomicUsize::new(0),
        }
    }
}

impl CandleProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn fetch_candles(
        &self,
        _symbol: &str,
        _timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_limit.store(limit, Ordering::SeqCst);
        match &self.candles {
            Ok(c) => Ok(c.iter().rev().take(limit).rev().copied().collect()),
            Err(msg) => Err(FetchError::Network(msg.clone())),
        }
    }
}

fn insufficient() -> Result<AnalysisResponse, String> {
    Ok(AnalysisResponse::InsufficientData {
        available_bars: 20,
        required_bars: 200,
    })
}

fn fetcher(backend: Arc<StubBackend>, provider: Arc<StubProvider>) -> ContextFetcher {
    ContextFetcher::new(
        backend,
        provider,
        Arc::new(AnalysisCache::new(Duration::from_secs(300), 16)),
        IndicatorEngine::default(),
        300,
    )
}

// ── Branches ─────────────────────────────────────────────────────────

#[test]
fn backend_ok_skips_candles() {
    let backend = Arc::new(StubBackend::new(
        Ok(AnalysisResponse::Ok {
            analysis: server_analysis(),
        }),
        EphemeralBehavior::Ok,
    ));
    let provider = Arc::new(StubProvider::with(synthetic::trending(300, 1)));
    let ctx = fetcher(backend.clone(), provider.clone()).fetch("btcusdt", "1h").unwrap();

    assert_eq!(ctx.source, ContextSource::Backend);
    assert_eq!(ctx.symbol, "BTCUSDT");
    assert_eq!(ctx.regime.market_state, MarketState::Chop);
    assert_eq!(ctx.regime.confidence, Some(0.7));
    assert!(ctx.candles_hash.is_none());
    assert!(ctx.snapshot.is_none());
    assert!(!ctx.cached);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn insufficient_data_then_ephemeral_ok() {
    let backend = Arc::new(StubBackend::new(insufficient(), EphemeralBehavior::Ok));
    let provider = Arc::new(StubProvider::with(synthetic::trending(400, 2)));
    let ctx = fetcher(backend.clone(), provider.clone()).fetch("ETHUSDT", "4h").unwrap();

    assert_eq!(ctx.source, ContextSource::Ephemeral);
    assert_eq!(ctx.regime.trend_strength, 18.0);
    assert_eq!(ctx.candles_hash.as_ref().map(String::len), Some(64));
    assert!(ctx.snapshot.is_none());
    assert_eq!(provider.last_limit.load(Ordering::SeqCst), 300);
    assert_eq!(backend.last_ephemeral_len.load(Ordering::SeqCst), 300);
}

#[test]
fn ephemeral_rejection_falls_back_to_local_engine() {
    let backend = Arc::new(StubBackend::new(insufficient(), EphemeralBehavior::Rejects));
    let candles = synthetic::trending(300, 3);
    let provider = Arc::new(StubProvider::with(candles.clone()));
    let ctx = fetcher(backend, provider).fetch("SOLUSDT", "1h").unwrap();

    assert_eq!(ctx.source, ContextSource::Client);
    let snap = ctx.snapshot.as_ref().unwrap();
    assert_eq!(*snap, IndicatorEngine::default().snapshot(&candles));
    assert_eq!(ctx.regime.trend_direction, snap.trend_direction);
    assert_eq!(
        ctx.candles_hash.as_deref(),
        Some(regimelab_core::fingerprint::window_hash(&candles).as_str())
    );
}

#[test]
fn ephemeral_transport_failure_falls_back_to_local_engine() {
    let backend = Arc::new(StubBackend::new(insufficient(), EphemeralBehavior::Unreachable));
    let provider = Arc::new(StubProvider::with(synthetic::ranging(300, 4)));
    let ctx = fetcher(backend.clone(), provider).fetch("ADAUSDT", "1h").unwrap();

    assert_eq!(ctx.source, ContextSource::Client);
    assert!(ctx.snapshot.is_some());
    assert_eq!(backend.ephemeral_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn backend_error_is_returned_without_fallback() {
    let backend = Arc::new(StubBackend::new(
        Ok(AnalysisResponse::Error {
            message: "symbol delisted".into(),
        }),
        EphemeralBehavior::Ok,
    ));
    let provider = Arc::new(StubProvider::with(synthetic::trending(300, 1)));
    let err = fetcher(backend.clone(), provider.clone())
        .fetch("LUNAUSDT", "1h")
        .unwrap_err();

    assert!(matches!(err, FetchError::Backend(ref m) if m == "symbol delisted"));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.ephemeral_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn backend_transport_error_is_returned() {
    let backend = Arc::new(StubBackend::new(
        Err("connection refused".into()),
        EphemeralBehavior::Ok,
    ));
    let provider = Arc::new(StubProvider::with(synthetic::trending(300, 1)));
    let err = fetcher(backend, provider.clone()).fetch("BTCUSDT", "1h").unwrap_err();

    assert!(matches!(err, FetchError::Network(_)));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn provider_failure_is_returned() {
    let backend = Arc::new(StubBackend::new(insufficient(), EphemeralBehavior::Ok));
    let err = fetcher(backend.clone(), Arc::new(StubProvider::failing()))
        .fetch("BTCUSDT", "1h")
        .unwrap_err();

    assert!(matches!(err, FetchError::Network(_)));
    assert_eq!(backend.ephemeral_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn invalid_candle_window_is_rejected() {
    let mut candles = synthetic::trending(300, 5);
    candles[100].timestamp = candles[99].timestamp;
    let backend = Arc::new(StubBackend::new(insufficient(), EphemeralBehavior::Ok));
    let err = fetcher(backend.clone(), Arc::new(StubProvider::with(candles)))
        .fetch("BTCUSDT", "1h")
        .unwrap_err();

    assert!(matches!(err, FetchError::Data(_)));
    assert_eq!(backend.ephemeral_calls.load(Ordering::SeqCst), 0);
}

// ── Caching ──────────────────────────────────────────────────────────

#[test]
fn second_fetch_is_served_from_cache() {
    let backend = Arc::new(StubBackend::new(insufficient(), EphemeralBehavior::Rejects));
    let provider = Arc::new(StubProvider::with(synthetic::trending(300, 6)));
    let f = fetcher(backend.clone(), provider.clone());

    let first = f.fetch("BTCUSDT", "1h").unwrap();
    let second = f.fetch("btcusdt", "1h").unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(second.source, ContextSource::Client);
    assert_eq!(second.fetched_at, first.fetched_at);
    assert_eq!(backend.analyze_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    // A different timeframe is a different key.
    f.fetch("BTCUSDT", "4h").unwrap();
    assert_eq!(backend.analyze_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn errors_are_not_cached() {
    let backend = Arc::new(StubBackend::new(
        Ok(AnalysisResponse::Error {
            message: "try later".into(),
        }),
        EphemeralBehavior::Ok,
    ));
    let f = fetcher(backend.clone(), Arc::new(StubProvider::with(Vec::new())));
    assert!(f.fetch("BTCUSDT", "1h").is_err());
    assert!(f.fetch("BTCUSDT", "1h").is_err());
    assert_eq!(backend.analyze_calls.load(Ordering::SeqCst), 2);
    assert!(f.cache().is_empty());
}

// ── Parallel ─────────────────────────────────────────────────────────

#[test]
fn fetch_many_keeps_request_order() {
    let backend = Arc::new(StubBackend::new(insufficient(), EphemeralBehavior::Unreachable));
    let provider = Arc::new(StubProvider::with(synthetic::ranging(300, 7)));
    let f = fetcher(backend, provider);

    let requests: Vec<(String, String)> = ["BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT"]
        .iter()
        .map(|s| (s.to_string(), "1h".to_string()))
        .collect();
    let results = f.fetch_many(&requests);

    assert_eq!(results.len(), 4);
    for (result, (symbol, _)) in results.iter().zip(&requests) {
        let ctx = result.as_ref().unwrap();
        assert_eq!(&ctx.symbol, symbol);
        assert_eq!(ctx.source, ContextSource::Client);
    }
    assert_eq!(f.cache().len(), 4);
}
