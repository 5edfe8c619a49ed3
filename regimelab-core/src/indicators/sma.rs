//! Simple Moving Average (SMA) and its per-bar slope.
//!
//! slope = (SMA[t] - SMA[t-1]) / SMA[t], a fractional per-bar change
//! normalized by the current average.
//! Lookback: period for the SMA, period + 1 for the slope.

/// Mean of the trailing `period` values, `None` with fewer than `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Fractional change between the two most recent trailing SMAs.
///
/// Returns 0 with fewer than `period + 1` closes or a non-positive current SMA.
pub fn ma_slope(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return 0.0;
    }

    let (Some(current), Some(previous)) = (
        sma(closes, period),
        sma(&closes[..closes.len() - 1], period),
    ) else {
        return 0.0;
    };

    if current <= 0.0 {
        return 0.0;
    }

    (current - previous) / current
}
