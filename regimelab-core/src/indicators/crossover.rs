//! EMA crossover detector (fast over slow, default 9/21).
//!
//! 1. For each of the trailing 10 bars, recompute both EMAs from scratch over
//!    all history up to and including that bar.
//! 2. Take diff = fast - slow at each of those bars.
//! 3. Scan the last 5 consecutive pairs, most recent first, for a sign change.
//!
//! `bars_ago` is 0 when the cross happened on the most recent bar.

use serde::{Deserialize, Serialize};

use super::ema::ema_last;
use crate::domain::Candle;

/// Minimum candle count before any crossover is reported.
pub const CROSSOVER_MIN_CANDLES: usize = 25;

/// Number of trailing bars whose EMAs are recomputed.
const TRAILING_BARS: usize = 10;

/// Number of bar pairs scanned for a sign change.
const SCANNED_PAIRS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverKind {
    BullishCrossover,
    BearishCrossover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmaCrossover {
    #[serde(rename = "type")]
    pub kind: CrossoverKind,
    pub bars_ago: usize,
}

/// Most recent fast/slow EMA crossover within the last 5 bar pairs.
///
/// Returns `None` with fewer than 25 candles or when no sign change is found.
/// A pair where either EMA is still warming up never counts as a cross.
pub fn ema_crossover(candles: &[Candle], fast: usize, slow: usize) -> Option<EmaCrossover> {
    let n = candles.len();
    if n < CROSSOVER_MIN_CANDLES || fast == 0 || slow == 0 {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let diffs: Vec<f64> = (n - TRAILING_BARS..n)
        .map(|end| {
            let history = &closes[..=end];
            match (ema_last(history, fast), ema_last(history, slow)) {
                (Some(f), Some(s)) => f - s,
                _ => f64::NAN,
            }
        })
        .collect();

    for bars_ago in 0..SCANNED_PAIRS {
        let cur = diffs[TRAILING_BARS - 1 - bars_ago];
        let prev = diffs[TRAILING_BARS - 2 - bars_ago];
        if cur.is_nan() || prev.is_nan() {
            continue;
        }

        if prev <= 0.0 && cur > 0.0 {
            return Some(EmaCrossover {
                kind: CrossoverKind::BullishCrossover,
                bars_ago,
            });
        }
        if prev >= 0.0 && cur < 0.0 {
            return Some(EmaCrossover {
                kind: CrossoverKind::BearishCrossover,
                bars_ago,
            });
        }
    }

    None
}
