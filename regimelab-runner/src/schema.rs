//! Wire contract with the analysis backend.
//!
//! Responses are discriminated by a `status` tag so every outcome is a
//! distinct variant instead of a bag of optional fields:
//!
//! - `{"status": "ok", "analysis": {...}}`
//! - `{"status": "insufficient_data", "available_bars": 12, "required_bars": 100}`
//! - `{"status": "error", "message": "..."}`
//!
//! An unknown tag fails deserialization. A decoded analysis is additionally
//! checked with [`BackendAnalysis::validate`] before it is trusted.

use regimelab_core::{Candle, MarketState, TrendDirection, VolatilityRegime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("trend_strength must be finite and within 0..=100, got {0}")]
    TrendStrengthOutOfRange(f64),

    #[error("{field} must be within 0..=1, got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    #[error("insufficient_data with required_bars = 0")]
    ZeroRequiredBars,
}

/// Response of `GET /api/analysis/{symbol}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisResponse {
    Ok {
        analysis: BackendAnalysis,
    },
    InsufficientData {
        available_bars: usize,
        required_bars: usize,
    },
    Error {
        message: String,
    },
}

/// Response of `POST /api/analysis/ephemeral`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EphemeralResponse {
    Ok { analysis: BackendAnalysis },
    Error { message: String },
}

/// Body of `POST /api/analysis/ephemeral`. Nothing is persisted server-side.
#[derive(Debug, Clone, Serialize)]
pub struct EphemeralRequest<'a> {
    pub symbol: &'a str,
    pub timeframe: &'a str,
    pub candles: &'a [Candle],
}

/// Server-side regime analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendAnalysis {
    pub market_state: MarketState,
    pub volatility_regime: VolatilityRegime,
    pub trend_direction: TrendDirection,
    pub trend_strength: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
}

/// Optional directional forecast attached by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub direction: TrendDirection,
    pub horizon_bars: u32,
    pub probability: f64,
}

impl BackendAnalysis {
    pub fn validate(&self) -> Result<(), SchemaError> {
        if !self.trend_strength.is_finite() || !(0.0..=100.0).contains(&self.trend_strength) {
            return Err(SchemaError::TrendStrengthOutOfRange(self.trend_strength));
        }
        if let Some(confidence) = self.confidence {
            check_probability("confidence", confidence)?;
        }
        if let Some(forecast) = &self.forecast {
            check_probability("forecast.probability", forecast.probability)?;
        }
        Ok(())
    }
}

impl AnalysisResponse {
    pub fn validate(&self) -> Result<(), SchemaError> {
        match self {
            AnalysisResponse::Ok { analysis } => analysis.validate(),
            AnalysisResponse::InsufficientData { required_bars: 0, .. } => {
                Err(SchemaError::ZeroRequiredBars)
            }
            _ => Ok(()),
        }
    }
}

impl EphemeralResponse {
    pub fn validate(&self) -> Result<(), SchemaError> {
        match self {
            EphemeralResponse::Ok { analysis } => analysis.validate(),
            EphemeralResponse::Error { .. } => Ok(()),
        }
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), SchemaError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SchemaError::ProbabilityOutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> BackendAnalysis {
        BackendAnalysis {
            market_state: MarketState::Trend,
            volatility_regime: VolatilityRegime::Normal,
            trend_direction: TrendDirection::Up,
            trend_strength: 31.5,
            confidence: Some(0.8),
            forecast: None,
        }
    }

    #[test]
    fn ok_response_decodes() {
        let json = r#"{
            "status": "ok",
            "analysis": {
                "market_state": "trend_volatile",
                "volatility_regime": "high",
                "trend_direction": "down",
                "trend_strength": 42.0,
                "forecast": {"direction": "down", "horizon_bars": 12, "probability": 0.61}
            }
        }"#;
        let resp: AnalysisResponse = serde_json::from_str(json).unwrap();
        let AnalysisResponse::Ok { analysis } = &resp else {
            panic!("expected ok, got {resp:?}");
        };
        assert_eq!(analysis.market_state, MarketState::TrendVolatile);
        assert_eq!(analysis.confidence, None);
        assert_eq!(analysis.forecast.as_ref().unwrap().horizon_bars, 12);
        assert!(resp.validate().is_ok());
    }

    #[test]
    fn insufficient_data_decodes() {
        let json = r#"{"status":"insufficient_data","available_bars":12,"required_bars":100}"#;
        let resp: AnalysisResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp,
            AnalysisResponse::InsufficientData {
                available_bars: 12,
                required_bars: 100
            }
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let json = r#"{"status":"pending"}"#;
        assert!(serde_json::from_str::<AnalysisResponse>(json).is_err());
        assert!(serde_json::from_str::<EphemeralResponse>(
            r#"{"status":"insufficient_data","available_bars":1,"required_bars":2}"#
        )
        .is_err());
    }

    #[test]
    fn error_response_serializes_with_tag() {
        let resp = EphemeralResponse::Error {
            message: "model offline".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "model offline");
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut a = analysis();
        a.trend_strength = f64::NAN;
        assert!(matches!(a.validate(), Err(SchemaError::TrendStrengthOutOfRange(_))));

        let mut a = analysis();
        a.trend_strength = 140.0;
        assert!(a.validate().is_err());

        let mut a = analysis();
        a.confidence = Some(1.5);
        assert_eq!(
            a.validate(),
            Err(SchemaError::ProbabilityOutOfRange {
                field: "confidence",
                value: 1.5
            })
        );

        assert!(AnalysisResponse::InsufficientData {
            available_bars: 0,
            required_bars: 0
        }
        .validate()
        .is_err());
    }

    #[test]
    fn ephemeral_request_carries_candles() {
        let candles = [Candle {
            timestamp: 1,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 3.0,
        }];
        let req = EphemeralRequest {
            symbol: "BTCUSDT",
            timeframe: "1h",
            candles: &candles,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["candles"][0]["close"], 1.5);
        assert_eq!(json["timeframe"], "1h");
    }
}
