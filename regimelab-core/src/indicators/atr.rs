//! Average True Range (ATR).
//!
//! True Range over a consecutive pair: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR uses Wilder's running average (alpha = 1/period) seeded by the mean
//! of the first `period` true ranges.
//! Lookback: period (needs period+1 candles).

use crate::domain::Candle;

use super::smoothing::wilder_average;

/// True range for each consecutive pair of bars.
///
/// Output element `i` describes bar `i + 1` against the close of bar `i`,
/// so the result has one element fewer than the input (empty below 2 bars).
/// The three slices are read up to the shortest length.
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let n = highs.len().min(lows.len()).min(closes.len());
    if n < 2 {
        return Vec::new();
    }

    (1..n)
        .map(|i| {
            let h = highs[i];
            let l = lows[i];
            let pc = closes[i - 1];
            (h - l).max((h - pc).abs()).max((l - pc).abs())
        })
        .collect()
}

/// ATR series aligned with `candles`. The first `period` values are `NaN`.
pub fn atr_series(candles: &[Candle], period: usize) -> Vec<f64> {
    let n = candles.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let tr = true_range(&highs, &lows, &closes);
    for (i, v) in wilder_average(&tr, period).into_iter().enumerate() {
        result[i + 1] = v;
    }
    result
}

/// Latest ATR as a percentage of the latest close.
///
/// Returns 0 with fewer than `period + 1` candles or a non-positive close.
pub fn atr_pct(candles: &[Candle], period: usize) -> f64 {
    let Some(last) = candles.last() else {
        return 0.0;
    };
    if period == 0 || candles.len() < period + 1 || last.close <= 0.0 {
        return 0.0;
    }

    match atr_series(candles, period).last() {
        Some(&atr) if !atr.is_nan() => atr / last.close * 100.0,
        _ => 0.0,
    }
}
