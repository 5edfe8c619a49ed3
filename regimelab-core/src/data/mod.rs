//! Candle data at the crate boundary: validation, file loading, synthetic series.
//!
//! The indicator engine itself accepts any slice of candles. These helpers are
//! for callers that want to reject bad windows before analysis.

pub mod load;
pub mod synthetic;
pub mod validate;

pub use load::{load_candles, load_candles_csv, load_candles_json, write_candles_json};
pub use validate::validate_window;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("empty candle window")]
    Empty,

    #[error("candle {index} has a non-finite value")]
    NonFinite { index: usize },

    #[error("timestamps not ascending at candle {index} ({prev} then {current})")]
    NotAscending { index: usize, prev: i64, current: i64 },

    #[error("unsupported candle file extension: {0}")]
    UnsupportedFormat(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
