//! Fetcher configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8000"
//! analysis_timeout_ms = 10000
//! ephemeral_timeout_ms = 5000
//!
//! [market_data]
//! base_url = "https://api.binance.com"
//! candle_limit = 300
//! timeout_ms = 10000
//!
//! [cache]
//! ttl_secs = 300
//! max_entries = 256
//!
//! [engine]
//! trend_period = 14
//! ```

use std::path::Path;
use std::time::Duration;

use regimelab_core::EngineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub backend: BackendConfig,
    pub market_data: MarketDataConfig,
    pub cache: CacheConfig,
    pub engine: EngineConfig,
}

/// Remote analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub analysis_timeout_ms: u64,
    pub ephemeral_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            analysis_timeout_ms: 10_000,
            ephemeral_timeout_ms: 5_000,
        }
    }
}

impl BackendConfig {
    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_millis(self.analysis_timeout_ms)
    }

    pub fn ephemeral_timeout(&self) -> Duration {
        Duration::from_millis(self.ephemeral_timeout_ms)
    }
}

/// Public exchange REST API used for candles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub candle_limit: usize,
    pub timeout_ms: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".into(),
            candle_limit: 300,
            timeout_ms: 10_000,
        }
    }
}

impl MarketDataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_entries: 256,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl FetcherConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = self.engine.zero_periods();
        if !zero.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "engine periods must be positive: {}",
                zero.join(", ")
            )));
        }
        if self.engine.band_multiplier.is_nan() || self.engine.band_multiplier <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "engine.band_multiplier must be positive, got {}",
                self.engine.band_multiplier
            )));
        }
        let min = self.engine.min_candles();
        if self.market_data.candle_limit < min {
            return Err(ConfigError::Invalid(format!(
                "market_data.candle_limit {} is below the engine minimum of {min}",
                self.market_data.candle_limit
            )));
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid("cache.ttl_secs must be positive".into()));
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid("cache.max_entries must be positive".into()));
        }
        if self.backend.base_url.trim().is_empty() || self.market_data.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base URLs must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_is_default() {
        let config = FetcherConfig::from_toml_str("").unwrap();
        assert_eq!(config, FetcherConfig::default());
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.ephemeral_timeout(), Duration::from_secs(5));
        assert_eq!(config.market_data.candle_limit, 300);
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.engine.trend_period, 14);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = FetcherConfig::from_toml_str(
            r#"
            [backend]
            base_url = "https://analysis.example.com"

            [engine]
            ema_fast = 12
            ema_slow = 26
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "https://analysis.example.com");
        assert_eq!(config.backend.analysis_timeout_ms, 10_000);
        assert_eq!((config.engine.ema_fast, config.engine.ema_slow), (12, 26));
        assert_eq!(config.engine.trend_period, 14);
    }

    #[test]
    fn zero_period_rejected() {
        let err = FetcherConfig::from_toml_str("[engine]\nrsi_period = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("rsi_period")));
    }

    #[test]
    fn candle_limit_below_engine_minimum_rejected() {
        let err = FetcherConfig::from_toml_str("[market_data]\ncandle_limit = 30\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("candle_limit")));
    }

    #[test]
    fn huge_engine_period_is_rejected_without_overflow() {
        let err = FetcherConfig::from_toml_str(
            "[engine]\nvolatility_window = 9223372036854775807\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("candle_limit")));
    }

    #[test]
    fn zero_cache_settings_rejected() {
        assert!(FetcherConfig::from_toml_str("[cache]\nttl_secs = 0\n").is_err());
        assert!(FetcherConfig::from_toml_str("[cache]\nmax_entries = 0\n").is_err());
    }

    #[test]
    fn bad_multiplier_rejected() {
        assert!(FetcherConfig::from_toml_str("[engine]\nband_multiplier = 0.0\n").is_err());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = FetcherConfig::from_toml_str("[cache\nttl_secs = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regimelab.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[cache]\nttl_secs = 60\nmax_entries = 8").unwrap();
        drop(f);

        let config = FetcherConfig::from_file(&path).unwrap();
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.max_entries, 8);

        let missing = FetcherConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
