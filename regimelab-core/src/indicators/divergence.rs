//! Momentum divergence between price and an oscillator (RSI by default).
//!
//! Heuristic, not a swing-point detector. Over the trailing window (20 bars):
//! 1. Split it into an early part (indices 0..=10) and a recent part (11..).
//! 2. Bullish: the lowest low of the whole window sits in the recent part
//!    (a lower low than anything early) while the oscillator's lowest value
//!    in the recent part stays above its early minimum (a higher low).
//! 3. Bearish: the symmetric test on highs and the oscillator's maxima.
//!
//! Only the single global extremum per part is inspected, so a pattern with
//! several swings may read differently than it looks on a chart.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

/// Trailing window inspected by [`momentum_divergence`].
pub const DIVERGENCE_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Divergence {
    BullishDivergence,
    BearishDivergence,
    /// Never produced by the detector. Accepted when decoding payloads that
    /// spell out the absence of a divergence.
    None,
}

/// Divergence over the trailing 20 candles and oscillator values.
///
/// `oscillator` is aligned with `candles`. Returns `None` when no divergence
/// is detected, when either series is shorter than the window, or when the
/// oscillator is still warming up (`NaN`) inside the window.
pub fn momentum_divergence(candles: &[Candle], oscillator: &[f64]) -> Option<Divergence> {
    momentum_divergence_over(candles, oscillator, DIVERGENCE_WINDOW)
}

/// [`momentum_divergence`] with a custom window length. The early part is
/// `0..=window / 2`.
pub fn momentum_divergence_over(
    candles: &[Candle],
    oscillator: &[f64],
    window: usize,
) -> Option<Divergence> {
    if window < 4 || candles.len() < window || oscillator.len() < window {
        return None;
    }

    let candles = &candles[candles.len() - window..];
    let osc = &oscillator[oscillator.len() - window..];
    if osc.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let split = window / 2;
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();

    // Bullish: lower low in price, higher low in the oscillator.
    let price_low = argmin(&lows)?;
    if price_low > split
        && lows[price_low] < min_of(&lows[..=split])
        && min_of(&osc[split + 1..]) > min_of(&osc[..=split])
    {
        return Some(Divergence::BullishDivergence);
    }

    // Bearish: higher high in price, lower high in the oscillator.
    let price_high = argmax(&highs)?;
    if price_high > split
        && highs[price_high] > max_of(&highs[..=split])
        && max_of(&osc[split + 1..]) < max_of(&osc[..=split])
    {
        return Some(Divergence::BearishDivergence);
    }

    None
}

/// Index of the first occurrence of the minimum.
fn argmin(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some(b) if v >= values[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Index of the first occurrence of the maximum.
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some(b) if v <= values[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_candles, rsi_series};

    fn candles_with_lows(lows: &[f64]) -> Vec<Candle> {
        lows.iter()
            .enumerate()
            .map(|(i, &low)| Candle {
                timestamp: i as i64 * 60_000,
                open: low + 1.0,
                high: low + 2.0,
                low,
                close: low + 1.0,
                volume: 1.0,
            })
            .collect()
    }

    #[test]
    fn bullish_lower_low_with_higher_oscillator_low() {
        let mut lows = vec![100.0; 20];
        lows[5] = 95.0;
        lows[15] = 90.0;
        let mut osc = vec![50.0; 20];
        osc[5] = 20.0;
        osc[15] = 30.0;
        assert_eq!(
            momentum_divergence(&candles_with_lows(&lows), &osc),
            Some(Divergence::BullishDivergence)
        );
    }

    #[test]
    fn no_divergence_when_oscillator_confirms_low() {
        let mut lows = vec![100.0; 20];
        lows[5] = 95.0;
        lows[15] = 90.0;
        let mut osc = vec![50.0; 20];
        osc[5] = 30.0;
        osc[15] = 20.0;
        assert_eq!(momentum_divergence(&candles_with_lows(&lows), &osc), None);
    }

    #[test]
    fn price_extreme_in_early_part_is_ignored() {
        // Lowest low at index 10, which is not past the first half.
        let mut lows = vec![100.0; 20];
        lows[10] = 80.0;
        lows[15] = 90.0;
        let mut osc = vec![50.0; 20];
        osc[5] = 20.0;
        osc[15] = 30.0;
        assert_eq!(momentum_divergence(&candles_with_lows(&lows), &osc), None);
    }

    #[test]
    fn oscillator_low_compared_per_part() {
        // The oscillator's recent low sits right after the split and its
        // overall low is early; only the two part minima are compared.
        let mut lows = vec![100.0; 20];
        lows[3] = 95.0;
        lows[19] = 90.0;
        let mut osc = vec![50.0; 20];
        osc[0] = 10.0;
        osc[11] = 25.0;
        assert_eq!(
            momentum_divergence(&candles_with_lows(&lows), &osc),
            Some(Divergence::BullishDivergence)
        );

        osc[11] = 5.0;
        assert_eq!(momentum_divergence(&candles_with_lows(&lows), &osc), None);
    }

    #[test]
    fn bearish_higher_high_with_lower_oscillator_high() {
        let mut lows = vec![100.0; 20];
        lows[4] = 105.0;
        lows[17] = 110.0;
        let mut osc = vec![50.0; 20];
        osc[4] = 80.0;
        osc[17] = 70.0;
        assert_eq!(
            momentum_divergence(&candles_with_lows(&lows), &osc),
            Some(Divergence::BearishDivergence)
        );
    }

    #[test]
    fn only_trailing_window_is_inspected() {
        let mut lows = vec![100.0; 30];
        lows[15] = 95.0;
        lows[25] = 90.0;
        let mut osc = vec![50.0; 30];
        osc[15] = 20.0;
        osc[25] = 30.0;
        // A much lower low before the window does not matter.
        lows[2] = 10.0;
        assert_eq!(
            momentum_divergence(&candles_with_lows(&lows), &osc),
            Some(Divergence::BullishDivergence)
        );
    }

    #[test]
    fn short_or_warming_input_is_none() {
        let candles = candles_with_lows(&[100.0; 19]);
        assert_eq!(momentum_divergence(&candles, &[50.0; 19]), None);

        let candles = candles_with_lows(&[100.0; 20]);
        let mut osc = vec![50.0; 20];
        osc[0] = f64::NAN;
        assert_eq!(momentum_divergence(&candles, &osc), None);
    }

    #[test]
    fn clean_uptrend_has_no_divergence() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 * 1.003_f64.powi(i)).collect();
        let candles = make_candles(&closes);
        let rsi = rsi_series(&closes, 14);
        assert_eq!(momentum_divergence(&candles, &rsi), None);
    }
}
