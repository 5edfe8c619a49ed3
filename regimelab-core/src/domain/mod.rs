//! Domain types for regimelab

pub mod candle;

pub use candle::{hlc_series, Candle};
