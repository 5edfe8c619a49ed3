//! Return volatility and its z-score against history.
//!
//! The z-score compares the population stddev of the most recent `window`
//! bar-over-bar returns with the stddev of every return that precedes them,
//! as a relative excess:
//!
//! z = (recent_std - history_std) / history_std
//!
//! A stationary series scores near 0 whatever its cycle length; z = 2 means
//! recent volatility has tripled.

/// Population standard deviation (divide by N).
///
/// Exactly 0 for an empty slice or a slice of identical values, where the
/// rounded mean could otherwise leave a residue of one ulp.
pub fn population_std(values: &[f64]) -> f64 {
    match values.first() {
        None => return 0.0,
        Some(&first) if values.iter().all(|&v| v == first) => return 0.0,
        Some(_) => {}
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Fractional bar-over-bar returns. A zero previous close yields a 0 return.
pub fn bar_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0] })
        .collect()
}

/// Relative spread below which the history is treated as having no dispersion.
const FLAT_HISTORY_TOLERANCE: f64 = 1e-9;

/// Volatility z-score of the most recent `window` returns.
///
/// Needs at least `window` returns before the recent ones
/// (`2 * window + 1` closes); returns 0 otherwise, and 0 when the
/// preceding returns have no dispersion.
pub fn volatility_zscore(closes: &[f64], window: usize) -> f64 {
    if window == 0 {
        return 0.0;
    }
    let returns = bar_returns(closes);
    if returns.len() < window.saturating_mul(2) {
        return 0.0;
    }

    let split = returns.len() - window;
    let recent_std = population_std(&returns[split..]);

    let history = &returns[..split];
    let hist_std = population_std(history);
    if hist_std == 0.0 || hist_std <= mean(history).abs() * FLAT_HISTORY_TOLERANCE {
        return 0.0;
    }

    (recent_std - hist_std) / hist_std
}
