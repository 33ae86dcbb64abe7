//! Assessment pipeline
//!
//! This module provides the public API for Calmwave. The stateless
//! [`assess_reading`] scores one reading against a known baseline and
//! reference score; [`StressProcessor`] keeps the patient's rolling
//! reference score across readings and emits full report payloads.

use crate::calibration::ScoreTrend;
use crate::error::EngineError;
use crate::report::ReportEncoder;
use crate::score::{channel_deviations, try_stress_score, MIDPOINT_SCORE};
use crate::status::{percentage_increase, try_stress_status};
use crate::types::{Assessment, AssessmentPayload, BaselineMetrics, SensorMetrics, SensorReading};

/// Score and classify one reading against a baseline and reference score.
///
/// # Arguments
/// * `metrics` - Current sensor readings
/// * `baseline` - The patient's calibrated resting baseline
/// * `reference_score` - The patient's typical stress score
///
/// This is the validated path: invalid baselines and non-finite inputs are
/// rejected with an [`EngineError`] instead of producing a NaN score.
pub fn assess_reading(
    metrics: &SensorMetrics,
    baseline: &BaselineMetrics,
    reference_score: f64,
) -> Result<Assessment, EngineError> {
    let score = try_stress_score(metrics, baseline)?;
    let status = try_stress_status(score, reference_score)?;

    Ok(Assessment {
        score,
        status,
        label: status.label().to_string(),
        percentage_increase: percentage_increase(score, reference_score),
        reference_score,
        deviations: channel_deviations(metrics, baseline),
    })
}

/// Stateful processor for streaming readings with a rolling reference score.
///
/// Use this when scoring a sequence of readings for one patient: each
/// assessment is classified against the trend of previous scores, so a
/// sustained climb registers as rising/overload while the trend lags behind.
pub struct StressProcessor {
    baseline: BaselineMetrics,
    trend: ScoreTrend,
    encoder: ReportEncoder,
}

impl StressProcessor {
    /// Create a processor for a calibrated baseline.
    ///
    /// Fails if the baseline does not validate, so an invalid denominator is
    /// caught at construction rather than on the first reading.
    pub fn new(baseline: BaselineMetrics) -> Result<Self, EngineError> {
        baseline.validate()?;
        Ok(Self {
            baseline,
            trend: ScoreTrend::default(),
            encoder: ReportEncoder::new(),
        })
    }

    /// Create a processor with a specific trend window size
    pub fn with_trend_window(
        baseline: BaselineMetrics,
        window_size: usize,
    ) -> Result<Self, EngineError> {
        baseline.validate()?;
        Ok(Self {
            baseline,
            trend: ScoreTrend::new(window_size),
            encoder: ReportEncoder::new(),
        })
    }

    /// The reference score the next reading will be classified against.
    ///
    /// Before any reading has been scored this is the at-baseline midpoint,
    /// so the first classification compares against "resting".
    pub fn reference_score(&self) -> f64 {
        self.trend.reference_score().unwrap_or(MIDPOINT_SCORE)
    }

    /// Score and classify one reading, updating the rolling trend
    pub fn assess(&mut self, reading: &SensorReading) -> Result<AssessmentPayload, EngineError> {
        reading.validate()?;

        let reference = self.reference_score();
        let assessment = assess_reading(&reading.metrics, &self.baseline, reference)?;

        self.trend.push(assessment.score);

        Ok(self.encoder.encode(reading, &self.baseline, assessment))
    }

    /// Score and classify one reading, returning the payload as JSON
    pub fn assess_to_json(&mut self, reading: &SensorReading) -> Result<String, EngineError> {
        let payload = self.assess(reading)?;
        serde_json::to_string_pretty(&payload).map_err(EngineError::JsonError)
    }

    /// Load trend state from JSON
    pub fn load_trend(&mut self, json: &str) -> Result<(), EngineError> {
        self.trend =
            ScoreTrend::from_json(json).map_err(|e| EngineError::ParseError(e.to_string()))?;
        Ok(())
    }

    /// Save trend state to JSON
    pub fn save_trend(&self) -> Result<String, EngineError> {
        self.trend.to_json().map_err(EngineError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StressStatus;
    use chrono::Utc;

    fn baseline() -> BaselineMetrics {
        BaselineMetrics {
            baseline_hr: 65.0,
            baseline_hrv: 55.0,
            baseline_eda: 2.0,
        }
    }

    fn reading(hr: f64, hrv: f64, eda: f64) -> SensorReading {
        SensorReading {
            observed_at: Utc::now(),
            device_id: "band-7".to_string(),
            metrics: SensorMetrics {
                heart_rate: hr,
                hrv,
                eda,
            },
        }
    }

    #[test]
    fn test_assess_reading_calm_at_rest() {
        let assessment = assess_reading(
            &SensorMetrics {
                heart_rate: 65.0,
                hrv: 55.0,
                eda: 2.0,
            },
            &baseline(),
            50.0,
        )
        .unwrap();

        assert_eq!(assessment.score, 50.0);
        assert_eq!(assessment.status, StressStatus::Calm);
        assert_eq!(assessment.label, "Calm");
        assert_eq!(assessment.percentage_increase, 0.0);
    }

    #[test]
    fn test_assess_reading_overload_under_strain() {
        // Large deviations on every channel push the score near 100,
        // a ~100% increase over a resting reference of 50.
        let assessment = assess_reading(
            &SensorMetrics {
                heart_rate: 140.0,
                hrv: 15.0,
                eda: 9.0,
            },
            &baseline(),
            50.0,
        )
        .unwrap();

        assert!(assessment.score > 90.0);
        assert_eq!(assessment.status, StressStatus::Overload);
        assert_eq!(assessment.label, "Overload Predicted");
    }

    #[test]
    fn test_assess_reading_rejects_zero_baseline() {
        let zero = BaselineMetrics {
            baseline_hr: 0.0,
            baseline_hrv: 55.0,
            baseline_eda: 2.0,
        };
        let result = assess_reading(
            &SensorMetrics {
                heart_rate: 65.0,
                hrv: 55.0,
                eda: 2.0,
            },
            &zero,
            50.0,
        );
        assert!(matches!(result, Err(EngineError::InvalidBaseline(_))));
    }

    #[test]
    fn test_processor_first_reading_uses_midpoint_reference() {
        let mut processor = StressProcessor::new(baseline()).unwrap();
        assert_eq!(processor.reference_score(), 50.0);

        let payload = processor.assess(&reading(65.0, 55.0, 2.0)).unwrap();
        assert_eq!(payload.assessment.reference_score, 50.0);
        assert_eq!(payload.assessment.status, StressStatus::Calm);
    }

    #[test]
    fn test_processor_trend_follows_scores() {
        let mut processor = StressProcessor::new(baseline()).unwrap();

        // A run of calm readings keeps the reference near 50
        for _ in 0..5 {
            processor.assess(&reading(67.0, 53.0, 2.1)).unwrap();
        }
        let calm_reference = processor.reference_score();
        assert!(calm_reference < 60.0);

        // A sharp spike classifies against the calm trend
        let payload = processor.assess(&reading(150.0, 12.0, 10.0)).unwrap();
        assert_eq!(payload.assessment.status, StressStatus::Overload);
    }

    #[test]
    fn test_processor_rejects_invalid_baseline_at_construction() {
        let invalid = BaselineMetrics {
            baseline_hr: 65.0,
            baseline_hrv: -1.0,
            baseline_eda: 2.0,
        };
        assert!(StressProcessor::new(invalid).is_err());
    }

    #[test]
    fn test_trend_serialization_round_trip() {
        let mut processor = StressProcessor::new(baseline()).unwrap();
        processor.assess(&reading(80.0, 45.0, 3.0)).unwrap();
        processor.assess(&reading(82.0, 44.0, 3.1)).unwrap();

        let saved = processor.save_trend().unwrap();

        let mut restored = StressProcessor::new(baseline()).unwrap();
        restored.load_trend(&saved).unwrap();

        assert!((restored.reference_score() - processor.reference_score()).abs() < 1e-12);
    }

    #[test]
    fn test_assess_to_json_shape() {
        let mut processor = StressProcessor::new(baseline()).unwrap();
        let json = processor.assess_to_json(&reading(90.0, 40.0, 4.0)).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["provenance"]["device_id"], "band-7");
        assert!(parsed["assessment"]["score"].as_f64().is_some());
        assert!(parsed["assessment"]["deviations"]["weighted"]
            .as_f64()
            .is_some());
    }
}
