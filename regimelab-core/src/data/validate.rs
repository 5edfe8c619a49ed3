//! Candle window validation.

use super::DataError;
use crate::domain::Candle;

/// Reject empty windows, non-finite values and non-ascending timestamps.
///
/// The OHLC ordering invariant is not checked here; see
/// [`Candle::is_sane`] for that.
pub fn validate_window(candles: &[Candle]) -> Result<(), DataError> {
    if candles.is_empty() {
        return Err(DataError::Empty);
    }

    for (index, candle) in candles.iter().enumerate() {
        if candle.is_void() {
            return Err(DataError::NonFinite { index });
        }
        if index > 0 {
            let prev = candles[index - 1].timestamp;
            if candle.timestamp <= prev {
                return Err(DataError::NotAscending {
                    index,
                    prev,
                    current: candle.timestamp,
                });
            }
        }
    }

    Ok(())
}
