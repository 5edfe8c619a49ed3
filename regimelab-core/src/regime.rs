//! Market regime classification: trend direction, volatility regime and
//! market state from a handful of scalar indicator readings.
//!
//! The thresholds mirror the server-side regime detector. Every comparison
//! is strict, so a reading sitting exactly on a threshold does not qualify.

use serde::{Deserialize, Serialize};

/// Trend strength above which a market may be trending.
pub const TREND_STRENGTH_THRESHOLD: f64 = 25.0;
/// Per-bar MA slope magnitude both averages must exceed to set a direction.
pub const SLOPE_THRESHOLD: f64 = 0.001;
/// Volatility z-score above which volatility is high.
pub const HIGH_VOL_ZSCORE: f64 = 2.0;
/// ATR as a percentage of price above which volatility is high.
pub const HIGH_VOL_ATR_PCT: f64 = 3.0;
/// Volatility z-score below which volatility may be low.
pub const LOW_VOL_ZSCORE: f64 = 0.5;
/// ATR percentage below which volatility may be low.
pub const LOW_VOL_ATR_PCT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityRegime {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketState {
    Trend,
    TrendVolatile,
    Range,
    Chop,
}

impl std::fmt::Display for MarketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MarketState::Trend => "trend",
            MarketState::TrendVolatile => "trend_volatile",
            MarketState::Range => "range",
            MarketState::Chop => "chop",
        };
        f.write_str(s)
    }
}

/// Scalar readings the classifier consumes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegimeInputs {
    pub trend_strength: f64,
    pub ma_slope_short: f64,
    pub ma_slope_long: f64,
    pub volatility_zscore: f64,
    pub atr_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub trend_direction: TrendDirection,
    pub volatility_regime: VolatilityRegime,
    pub market_state: MarketState,
}

pub fn trend_direction(inputs: &RegimeInputs) -> TrendDirection {
    if inputs.trend_strength > TREND_STRENGTH_THRESHOLD {
        if inputs.ma_slope_short > SLOPE_THRESHOLD && inputs.ma_slope_long > SLOPE_THRESHOLD {
            return TrendDirection::Up;
        }
        if inputs.ma_slope_short < -SLOPE_THRESHOLD && inputs.ma_slope_long < -SLOPE_THRESHOLD {
            return TrendDirection::Down;
        }
    }
    TrendDirection::Sideways
}

pub fn volatility_regime(inputs: &RegimeInputs) -> VolatilityRegime {
    if inputs.volatility_zscore > HIGH_VOL_ZSCORE || inputs.atr_pct > HIGH_VOL_ATR_PCT {
        VolatilityRegime::High
    } else if inputs.volatility_zscore < LOW_VOL_ZSCORE && inputs.atr_pct < LOW_VOL_ATR_PCT {
        VolatilityRegime::Low
    } else {
        VolatilityRegime::Normal
    }
}

/// Classify all three axes. Market state depends on the other two.
///
/// NaN readings fail every comparison and fall through to
/// sideways / normal / range.
pub fn classify(inputs: &RegimeInputs) -> Classification {
    let direction = trend_direction(inputs);
    let volatility = volatility_regime(inputs);

    let trending =
        inputs.trend_strength > TREND_STRENGTH_THRESHOLD && direction != TrendDirection::Sideways;
    let market_state = if trending {
        if volatility == VolatilityRegime::High {
            MarketState::TrendVolatile
        } else {
            MarketState::Trend
        }
    } else if volatility == VolatilityRegime::High {
        MarketState::Chop
    } else {
        MarketState::Range
    };

    Classification {
        trend_direction: direction,
        volatility_regime: volatility,
        market_state,
    }
}
