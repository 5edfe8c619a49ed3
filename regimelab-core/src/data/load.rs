//! Candle files: CSV with a `timestamp,open,high,low,close,volume` header,
//! or a JSON array of candle objects with the same field names.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::DataError;
use crate::domain::Candle;

pub fn load_candles_csv(path: &Path) -> Result<Vec<Candle>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut candles = Vec::new();
    for record in reader.deserialize() {
        let candle: Candle = record?;
        candles.push(candle);
    }
    Ok(candles)
}

pub fn load_candles_json(path: &Path) -> Result<Vec<Candle>, DataError> {
    let file = File::open(path)?;
    let candles = serde_json::from_reader(BufReader::new(file))?;
    Ok(candles)
}

/// Load by file extension (`.csv` or `.json`).
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => load_candles_csv(path),
        "json" => load_candles_json(path),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }
}

/// Write candles as a pretty-printed JSON array.
pub fn write_candles_json(path: &Path, candles: &[Candle]) -> Result<(), DataError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), candles)?;
    Ok(())
}
