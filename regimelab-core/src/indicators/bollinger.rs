//! Bollinger band width: volatility compression/expansion proxy.
//!
//! Over the trailing `period` closes:
//! - Middle: SMA(close, period)
//! - Upper/Lower: middle +/- multiplier * stddev(close, period)
//! - Width %: (upper - lower) / middle * 100 = 2 * multiplier * stddev / middle * 100
//!
//! Uses population stddev (divide by N).

use super::volatility::population_std;

/// Band width of the trailing `period` closes as a percentage of the midline.
///
/// Returns 0 with fewer than `period` closes or a non-positive mean.
pub fn band_width_pct(closes: &[f64], period: usize, multiplier: f64) -> f64 {
    if period == 0 || closes.len() < period {
        return 0.0;
    }

    let window = &closes[closes.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    if mean <= 0.0 {
        return 0.0;
    }

    let stddev = population_std(window);
    let upper = mean + multiplier * stddev;
    let lower = mean - multiplier * stddev;

    (upper - lower) / mean * 100.0
}
