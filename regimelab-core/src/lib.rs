//! RegimeLab Core: indicator engine and market regime classification.
//!
//! This crate turns an ascending window of OHLCV candles into an
//! [`IndicatorSnapshot`]:
//! - Domain type (`Candle`) and series helpers
//! - Indicators: trend strength (ADX), band width, MA slope, volatility
//!   z-score, ATR%, RSI, EMA
//! - Detectors: momentum divergence and EMA crossover
//! - Regime classifier (trend direction, volatility regime, market state)
//! - Candle validation, CSV/JSON loading and seeded synthetic series
//!
//! Everything here is synchronous and free of I/O except `data::load`.
//! Indicator functions never fail: short or degenerate input yields their
//! documented default.

pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod regime;
pub mod snapshot;

pub use domain::Candle;
pub use regime::{
    classify, Classification, MarketState, RegimeInputs, TrendDirection, VolatilityRegime,
};
pub use snapshot::{EngineConfig, IndicatorEngine, IndicatorSnapshot};
