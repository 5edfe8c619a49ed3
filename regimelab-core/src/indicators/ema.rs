//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1)
//! Seed: EMA[period-1] = SMA of the first `period` values.
//! Lookback: period - 1.

/// EMA series aligned with `values`. The first `period - 1` outputs are `NaN`.
///
/// A `NaN` in the seed window yields an all-`NaN` series; a `NaN` after the
/// seed taints every later output.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    // Seed: SMA of first `period` values
    let mut sum = 0.0;
    for &v in values.iter().take(period) {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed = sum / period as f64;
    result[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        if values[i].is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}

/// Latest EMA value, `None` when fewer than `period` values exist.
pub fn ema_last(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period)
        .last()
        .copied()
        .filter(|v| !v.is_nan())
}
