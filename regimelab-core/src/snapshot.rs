//! Indicator engine: turns a candle window into an [`IndicatorSnapshot`].
//!
//! One call computes every feature for the latest candle from scratch:
//! 1. Trend strength (ADX), band width, short/long MA slopes
//! 2. Volatility z-score and ATR% feeding the classifier
//! 3. Trend direction, volatility regime and market state
//! 4. RSI divergence over the trailing window and the 9/21 EMA crossover
//!
//! Short windows never fail: each feature falls back to its documented default.

use serde::{Deserialize, Serialize};

use crate::domain::{hlc_series, Candle};
use crate::indicators::{
    atr_pct, band_width_pct, ema_crossover, ma_slope, momentum_divergence_over, rsi_series,
    trend_strength, volatility_zscore, Divergence, EmaCrossover, CROSSOVER_MIN_CANDLES,
};
use crate::regime::{classify, MarketState, RegimeInputs, TrendDirection, VolatilityRegime};

/// Periods and multipliers used by [`IndicatorEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub trend_period: usize,
    pub band_period: usize,
    pub band_multiplier: f64,
    pub ma_short_period: usize,
    pub ma_long_period: usize,
    pub atr_period: usize,
    pub rsi_period: usize,
    pub volatility_window: usize,
    pub divergence_window: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend_period: 14,
            band_period: 20,
            band_multiplier: 2.0,
            ma_short_period: 20,
            ma_long_period: 50,
            atr_period: 14,
            rsi_period: 14,
            volatility_window: 20,
            divergence_window: 20,
            ema_fast: 9,
            ema_slow: 21,
        }
    }
}

impl EngineConfig {
    /// Candles needed before every feature leaves its warmup default.
    /// Saturates at `usize::MAX` for absurd periods.
    pub fn min_candles(&self) -> usize {
        [
            self.trend_period.saturating_mul(2),
            self.band_period,
            self.ma_short_period.saturating_add(1),
            self.ma_long_period.saturating_add(1),
            self.atr_period.saturating_add(1),
            self.volatility_window.saturating_mul(2).saturating_add(1),
            self.rsi_period.saturating_add(self.divergence_window),
            CROSSOVER_MIN_CANDLES,
            self.ema_slow.saturating_add(10),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Names of the periods that are zero. Empty when the config is usable.
    pub fn zero_periods(&self) -> Vec<&'static str> {
        [
            ("trend_period", self.trend_period),
            ("band_period", self.band_period),
            ("ma_short_period", self.ma_short_period),
            ("ma_long_period", self.ma_long_period),
            ("atr_period", self.atr_period),
            ("rsi_period", self.rsi_period),
            ("volatility_window", self.volatility_window),
            ("divergence_window", self.divergence_window),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
        ]
        .into_iter()
        .filter(|(_, v)| *v == 0)
        .map(|(name, _)| name)
        .collect()
    }
}

/// Feature set describing the latest candle of a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub trend_strength: f64,
    pub band_width_pct: f64,
    pub ma_slope_short: f64,
    pub ma_slope_long: f64,
    #[serde(rename = "volatilityZScore")]
    pub volatility_zscore: f64,
    pub atr_pct: f64,
    pub volatility_regime: VolatilityRegime,
    pub trend_direction: TrendDirection,
    pub market_state: MarketState,
    pub momentum_divergence: Option<Divergence>,
    pub ema_crossover: Option<EmaCrossover>,
}

impl IndicatorSnapshot {
    /// The classifier inputs this snapshot was built from.
    pub fn regime_inputs(&self) -> RegimeInputs {
        RegimeInputs {
            trend_strength: self.trend_strength,
            ma_slope_short: self.ma_slope_short,
            ma_slope_long: self.ma_slope_long,
            volatility_zscore: self.volatility_zscore,
            atr_pct: self.atr_pct,
        }
    }
}

/// Stateless snapshot builder. Cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: EngineConfig,
}

impl IndicatorEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the snapshot for the last candle of `candles` (ascending by time).
    pub fn snapshot(&self, candles: &[Candle]) -> IndicatorSnapshot {
        let cfg = &self.config;
        let (highs, lows, close_series) = hlc_series(candles);

        let inputs = RegimeInputs {
            trend_strength: trend_strength(&highs, &lows, &close_series, cfg.trend_period),
            ma_slope_short: ma_slope(&close_series, cfg.ma_short_period),
            ma_slope_long: ma_slope(&close_series, cfg.ma_long_period),
            volatility_zscore: volatility_zscore(&close_series, cfg.volatility_window),
            atr_pct: atr_pct(candles, cfg.atr_period),
        };
        let classification = classify(&inputs);

        let rsi = rsi_series(&close_series, cfg.rsi_period);
        let momentum_divergence = momentum_divergence_over(candles, &rsi, cfg.divergence_window);
        let ema_crossover = ema_crossover(candles, cfg.ema_fast, cfg.ema_slow);

        IndicatorSnapshot {
            trend_strength: inputs.trend_strength,
            band_width_pct: band_width_pct(&close_series, cfg.band_period, cfg.band_multiplier),
            ma_slope_short: inputs.ma_slope_short,
            ma_slope_long: inputs.ma_slope_long,
            volatility_zscore: inputs.volatility_zscore,
            atr_pct: inputs.atr_pct,
            volatility_regime: classification.volatility_regime,
            trend_direction: classification.trend_direction,
            market_state: classification.market_state,
            momentum_divergence,
            ema_crossover,
        }
    }

    /// Snapshot of the close series only, for callers without OHLC data.
    ///
    /// Highs and lows are taken equal to the close.
    pub fn snapshot_closes(&self, close_series: &[f64]) -> IndicatorSnapshot {
        let candles: Vec<Candle> = close_series
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle {
                timestamp: i as i64,
                open: if i == 0 { c } else { close_series[i - 1] },
                high: c,
                low: c,
                close: c,
                volume: 0.0,
            })
            .collect();
        self.snapshot(&candles)
    }
}
