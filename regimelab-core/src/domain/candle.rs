//! Candle: one OHLCV observation.

use serde::{Deserialize, Serialize};

/// OHLCV candle for one interval.
///
/// `timestamp` is the interval open time in epoch milliseconds. A window of
/// candles is ordered by timestamp ascending. The engine does not validate
/// the OHLC invariant: malformed candles propagate as degenerate output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns true if any OHLCV field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite())
    }

    /// OHLC sanity: `high >= max(open, close)`, `low <= min(open, close)`, positive prices.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.low > 0.0
            && self.volume >= 0.0
    }
}

/// Split a candle window into parallel high/low/close series.
pub fn hlc_series(candles: &[Candle]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut highs = Vec::with_capacity(candles.len());
    let mut lows = Vec::with_capacity(candles.len());
    let mut closes = Vec::with_capacity(candles.len());
    for c in candles {
        highs.push(c.high);
        lows.push(c.low);
        closes.push(c.close);
    }
    (highs, lows, closes)
}
