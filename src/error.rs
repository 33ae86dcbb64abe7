//! Error types for Calmwave

use thiserror::Error;

/// Errors that can occur during scoring and assessment
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid baseline: {0}")]
    InvalidBaseline(String),

    #[error("Invalid reference score: {0}")]
    InvalidReference(String),

    #[error("Non-finite sensor reading: {0}")]
    NonFiniteReading(String),

    #[error("Insufficient calibration samples: have {have}, need {need}")]
    InsufficientSamples { have: usize, need: usize },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse payload: {0}")]
    ParseError(String),
}
