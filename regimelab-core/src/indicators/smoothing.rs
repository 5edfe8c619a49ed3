//! Wilder smoothing in its two conventional forms.
//!
//! - Running sum (`wilder_sum_smooth`): `s[i] = s[i-1] - s[i-1]/period + x[i]`,
//!   seeded by the plain sum of the first `period` values. Converges to
//!   `period * mean`, which is why the trend-strength calculator divides the
//!   final value by `period`.
//! - Running average (`wilder_average`): `a[i] = a[i-1] + (x[i] - a[i-1]) / period`,
//!   seeded by the mean of the first `period` values. Used by ATR and RSI.

/// Running-sum Wilder smoothing.
///
/// Returns a compact series: element 0 is the seed (the plain sum of
/// `values[0..period]`), element `k` corresponds to `values[period - 1 + k]`.
/// Empty when `period == 0` or fewer than `period` values exist.
pub fn wilder_sum_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let p = period as f64;
    let mut smoothed = Vec::with_capacity(values.len() - period + 1);

    // Seed: plain sum, not an exponential blend.
    let mut prev: f64 = values[..period].iter().sum();
    smoothed.push(prev);

    for &v in &values[period..] {
        prev = prev - prev / p + v;
        smoothed.push(prev);
    }

    smoothed
}

/// Running-average Wilder smoothing (alpha = 1/period), aligned with the input.
///
/// The first `period - 1` outputs are `NaN`; output `period - 1` is the mean of
/// the first `period` values. A `NaN` input taints every later output.
pub fn wilder_average(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = seed;

    let alpha = 1.0 / period as f64;
    let mut prev = seed;
    for i in period..n {
        let smoothed = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = smoothed;
        prev = smoothed;
    }

    result
}
