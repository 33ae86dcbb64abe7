//! Core types for the Calmwave engine
//!
//! This module defines the data structures that flow through the engine:
//! sensor readings, patient baselines, stress status, and assessment payloads.

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instantaneous physiological reading from a wearable device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorMetrics {
    /// Heart rate (beats per minute)
    pub heart_rate: f64,
    /// Heart-rate variability index (ms, RMSSD)
    pub hrv: f64,
    /// Electrodermal activity (microsiemens)
    pub eda: f64,
}

impl SensorMetrics {
    /// Check that all channels are finite numbers
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, value) in [
            ("heart_rate", self.heart_rate),
            ("hrv", self.hrv),
            ("eda", self.eda),
        ] {
            if !value.is_finite() {
                return Err(EngineError::NonFiniteReading(format!(
                    "{name} = {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Per-patient resting reference established during calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineMetrics {
    /// Resting heart rate (beats per minute)
    pub baseline_hr: f64,
    /// Resting HRV index (ms, RMSSD)
    pub baseline_hrv: f64,
    /// Resting electrodermal activity (microsiemens)
    pub baseline_eda: f64,
}

impl BaselineMetrics {
    /// Check that every channel is strictly positive and finite.
    ///
    /// Baseline values are denominators in the deviation formula; a zero or
    /// non-finite baseline would propagate NaN into the score.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, value) in [
            ("baseline_hr", self.baseline_hr),
            ("baseline_hrv", self.baseline_hrv),
            ("baseline_eda", self.baseline_eda),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidBaseline(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Stress status derived from a score's percentage increase over a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressStatus {
    Calm,
    Rising,
    Overload,
}

impl StressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StressStatus::Calm => "calm",
            StressStatus::Rising => "rising",
            StressStatus::Overload => "overload",
        }
    }

    /// Human-readable label shown to caregivers
    pub fn label(&self) -> &'static str {
        match self {
            StressStatus::Calm => "Calm",
            StressStatus::Rising => "Rising",
            StressStatus::Overload => "Overload Predicted",
        }
    }
}

/// Per-channel relative deviations behind a stress score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelDeviations {
    /// Relative heart-rate deviation (unitless, can exceed 1)
    pub heart_rate: f64,
    /// Relative HRV deviation
    pub hrv: f64,
    /// Relative EDA deviation
    pub eda: f64,
    /// Weighted combination fed into the sigmoid transform
    pub weighted: f64,
}

/// Timestamped, device-attributed sensor reading - the unit of streaming input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    /// When the reading was observed (UTC)
    pub observed_at: DateTime<Utc>,
    /// Device identifier for provenance tracking
    pub device_id: String,
    /// The physiological channels
    #[serde(flatten)]
    pub metrics: SensorMetrics,
}

impl SensorReading {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.metrics.validate()
    }
}

/// Assessment producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Assessment provenance information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub device_id: String,
    pub observed_at_utc: String,
    pub computed_at_utc: String,
}

/// The scored and classified result of one reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Stress score in [0, 100]
    pub score: f64,
    /// Classified status
    pub status: StressStatus,
    /// Human-readable status label
    pub label: String,
    /// Percentage increase of the score over the reference score
    pub percentage_increase: f64,
    /// Reference score the status was classified against
    pub reference_score: f64,
    /// Per-channel deviations behind the score
    pub deviations: ChannelDeviations,
}

/// Complete assessment payload emitted to consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentPayload {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub assessment: Assessment,
    pub baseline: BaselineMetrics,
}
