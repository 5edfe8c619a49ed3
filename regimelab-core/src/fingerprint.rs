//! Deterministic identification of candle windows.
//!
//! `window_hash` is BLAKE3 over every candle field, little-endian, in order,
//! as a hex string, so two contexts built from the same window can be
//! compared or cached by value.

use crate::domain::Candle;

/// Hash of a candle window. Any change to any field changes the hash.
pub fn window_hash(candles: &[Candle]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(candles.len() as u64).to_le_bytes());
    for c in candles {
        hasher.update(&c.timestamp.to_le_bytes());
        for v in [c.open, c.high, c.low, c.close, c.volume] {
            hasher.update(&v.to_bits().to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
