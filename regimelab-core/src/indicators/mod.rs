//! Indicator implementations.
//!
//! Every function here is a pure transformation of an immutable price
//! series. Scalar indicators describe the most recent bar and return a
//! documented default (0, or `None`) when the window is too short or a
//! denominator degenerates; they never panic and never return `Result`.
//! Series helpers return a vector aligned with the input, `NaN` in warmup.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod crossover;
pub mod divergence;
pub mod ema;
pub mod rsi;
pub mod sma;
pub mod smoothing;
pub mod volatility;

pub use adx::{directional_movement, trend_strength, trend_strength_candles, DirectionalMovement};
pub use atr::{atr_pct, atr_series, true_range};
pub use bollinger::band_width_pct;
pub use crossover::{ema_crossover, CrossoverKind, EmaCrossover, CROSSOVER_MIN_CANDLES};
pub use divergence::{momentum_divergence, momentum_divergence_over, Divergence, DIVERGENCE_WINDOW};
pub use ema::{ema_last, ema_series};
pub use rsi::rsi_series;
pub use sma::{ma_slope, sma};
pub use smoothing::{wilder_average, wilder_sum_smooth};
pub use volatility::{bar_returns, population_std, volatility_zscore};

/// Create synthetic candles from close prices for testing.
///
/// open = prev_close (or close for the first candle),
/// high = max(open, close) * 1.001, low = min(open, close) * 0.999,
/// volume = 1000, one-minute timestamps.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: 1_700_000_000_000 + i as i64 * 60_000,
                open,
                high: open.max(close) * 1.001,
                low: open.min(close) * 0.999,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
