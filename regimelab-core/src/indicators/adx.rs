//! Trend strength: Wilder's directional-movement index (ADX).
//!
//! Steps:
//! 1. Compute TR, +DM and -DM for each consecutive pair of bars
//! 2. Smooth all three with running-sum Wilder smoothing (seeded by a plain sum)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise; bars with zero
//!    smoothed TR are skipped
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI); bars with a zero DI sum are skipped
//! 5. Trend strength = running-sum Wilder smoothing of DX, latest value divided by period
//!
//! Values above 25 conventionally denote a trending market.
//! Lookback: period (needs period+1 bars), 2 * period for a fully smoothed value.

use crate::domain::Candle;

use super::atr::true_range;
use super::smoothing::wilder_sum_smooth;

/// Raw per-pair series feeding the directional-movement index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionalMovement {
    pub true_range: Vec<f64>,
    pub plus_dm: Vec<f64>,
    pub minus_dm: Vec<f64>,
}

/// Compute TR, +DM and -DM for each consecutive pair of bars.
///
/// +DM = `high[i] - high[i-1]` when it is positive and exceeds the down move,
/// else 0. -DM = `low[i-1] - low[i]` under the symmetric condition.
pub fn directional_movement(highs: &[f64], lows: &[f64], closes: &[f64]) -> DirectionalMovement {
    let n = highs.len().min(lows.len()).min(closes.len());
    if n < 2 {
        return DirectionalMovement::default();
    }

    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);

    for i in 1..n {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];

        plus_dm.push(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        });
        minus_dm.push(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        });
    }

    DirectionalMovement {
        true_range: true_range(&highs[..n], &lows[..n], &closes[..n]),
        plus_dm,
        minus_dm,
    }
}

/// Trend strength of the most recent bar.
///
/// Returns 0 when fewer than `period + 1` bars exist. When fewer than `period`
/// DX values can be formed, returns the last raw DX (or 0 if there is none).
pub fn trend_strength(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let n = highs.len().min(lows.len()).min(closes.len());
    if period == 0 || n < period + 1 {
        return 0.0;
    }

    let dm = directional_movement(highs, lows, closes);
    let smooth_tr = wilder_sum_smooth(&dm.true_range, period);
    let smooth_plus = wilder_sum_smooth(&dm.plus_dm, period);
    let smooth_minus = wilder_sum_smooth(&dm.minus_dm, period);

    let mut dx = Vec::with_capacity(smooth_tr.len());
    for ((&tr, &plus), &minus) in smooth_tr.iter().zip(&smooth_plus).zip(&smooth_minus) {
        if tr == 0.0 {
            continue;
        }
        let plus_di = 100.0 * plus / tr;
        let minus_di = 100.0 * minus / tr;
        let di_sum = plus_di + minus_di;
        if di_sum == 0.0 {
            continue;
        }
        dx.push(100.0 * (plus_di - minus_di).abs() / di_sum);
    }

    if dx.len() < period {
        return dx.last().copied().unwrap_or(0.0);
    }

    match wilder_sum_smooth(&dx, period).last() {
        Some(&adx_sum) => adx_sum / period as f64,
        None => 0.0,
    }
}

/// [`trend_strength`] over a candle window.
pub fn trend_strength_candles(candles: &[Candle], period: usize) -> f64 {
    let (highs, lows, closes) = crate::domain::hlc_series(candles);
    trend_strength(&highs, &lows, &closes, period)
}
