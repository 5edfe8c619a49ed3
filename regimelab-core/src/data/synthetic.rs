//! Seeded synthetic candle series for demos, tests and benches.
//!
//! Same seed, same candles. Timestamps are hourly from 2023-11-14T22:13:20Z.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::Candle;

const START_MS: i64 = 1_700_000_000_000;
const STEP_MS: i64 = 3_600_000;
const START_PRICE: f64 = 100.0;

/// Bars at the end of a [`reversal`] series that trend up.
pub const REVERSAL_BARS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticKind {
    Trend,
    Range,
    Reversal,
}

pub fn generate(kind: SyntheticKind, bars: usize, seed: u64) -> Vec<Candle> {
    match kind {
        SyntheticKind::Trend => trending(bars, seed),
        SyntheticKind::Range => ranging(bars, seed),
        SyntheticKind::Reversal => reversal(bars, seed),
    }
}

/// Steady uptrend: +0.1% to +0.5% every bar.
pub fn trending(bars: usize, seed: u64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut closes = Vec::with_capacity(bars);
    let mut price = START_PRICE;
    for _ in 0..bars {
        price *= 1.0 + 0.003 + rng.gen_range(-0.002..0.002);
        closes.push(price);
    }
    build(&closes, &mut rng)
}

/// Sideways oscillation around 100 with a 24-bar cycle and small noise.
pub fn ranging(bars: usize, seed: u64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let closes: Vec<f64> = (0..bars)
        .map(|i| {
            let cycle = 0.5 * (2.0 * std::f64::consts::PI * i as f64 / 24.0).sin();
            START_PRICE + cycle + rng.gen_range(-0.1..0.1)
        })
        .collect();
    build(&closes, &mut rng)
}

/// Downtrend of about -0.4% per bar that turns sharply up for the last
/// [`REVERSAL_BARS`] bars.
pub fn reversal(bars: usize, seed: u64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let turn = bars.saturating_sub(REVERSAL_BARS);
    let mut closes = Vec::with_capacity(bars);
    let mut price = START_PRICE * 3.0;
    for i in 0..bars {
        let drift = if i < turn { -0.004 } else { 0.08 };
        price *= 1.0 + drift + rng.gen_range(-0.001..0.001);
        closes.push(price);
    }
    build(&closes, &mut rng)
}

fn build(closes: &[f64], rng: &mut StdRng) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: START_MS + i as i64 * STEP_MS,
                open,
                high: open.max(close) * (1.0 + rng.gen_range(0.0..0.002)),
                low: open.min(close) * (1.0 - rng.gen_range(0.0..0.002)),
                close,
                volume: rng.gen_range(100.0..1_000.0),
            }
        })
        .collect()
}
