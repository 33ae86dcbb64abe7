//! Calibration and reference tracking
//!
//! This module builds per-patient baselines from resting sensor samples and
//! tracks a rolling reference score for status classification. Both stores
//! are bounded windows that serialize to JSON so state survives app restarts.

use crate::error::EngineError;
use crate::types::{BaselineMetrics, SensorMetrics};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default calibration window in samples (resting readings)
pub const DEFAULT_CALIBRATION_WINDOW: usize = 120;

/// Minimum samples before a baseline can be produced
pub const MIN_CALIBRATION_SAMPLES: usize = 12;

/// Default reference-score window in scored readings
pub const DEFAULT_TREND_WINDOW: usize = 48;

/// Rolling accumulator of resting readings that yields a patient baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineRecorder {
    /// Rolling heart-rate samples (bpm)
    hr_samples: VecDeque<f64>,
    /// Rolling HRV samples (ms)
    hrv_samples: VecDeque<f64>,
    /// Rolling EDA samples (microsiemens)
    eda_samples: VecDeque<f64>,
    /// Maximum window size
    window_size: usize,
}

impl Default for BaselineRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_CALIBRATION_WINDOW)
    }
}

impl BaselineRecorder {
    /// Create a new recorder with the specified window size
    pub fn new(window_size: usize) -> Self {
        Self {
            hr_samples: VecDeque::with_capacity(window_size),
            hrv_samples: VecDeque::with_capacity(window_size),
            eda_samples: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Record one resting reading. Non-finite readings are rejected so a
    /// single bad sample cannot poison the baseline averages.
    pub fn record(&mut self, metrics: &SensorMetrics) -> Result<(), EngineError> {
        metrics.validate()?;

        push_bounded(&mut self.hr_samples, metrics.heart_rate, self.window_size);
        push_bounded(&mut self.hrv_samples, metrics.hrv, self.window_size);
        push_bounded(&mut self.eda_samples, metrics.eda, self.window_size);
        Ok(())
    }

    /// Number of samples currently in the window
    pub fn sample_count(&self) -> usize {
        self.hr_samples.len()
    }

    /// Produce a baseline from the recorded samples.
    ///
    /// Fails with `InsufficientSamples` until enough resting readings have
    /// been recorded, and with `InvalidBaseline` if the averaged channels are
    /// not strictly positive (denominator safety for scoring).
    pub fn baseline(&self) -> Result<BaselineMetrics, EngineError> {
        let have = self.sample_count();
        if have < MIN_CALIBRATION_SAMPLES {
            return Err(EngineError::InsufficientSamples {
                have,
                need: MIN_CALIBRATION_SAMPLES,
            });
        }

        let baseline = BaselineMetrics {
            baseline_hr: rolling_average(&self.hr_samples),
            baseline_hrv: rolling_average(&self.hrv_samples),
            baseline_eda: rolling_average(&self.eda_samples),
        };
        baseline.validate()?;
        Ok(baseline)
    }

    /// Load recorder state from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize recorder state to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Rolling window of recent stress scores yielding the patient's typical
/// (reference) score for classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreTrend {
    scores: VecDeque<f64>,
    window_size: usize,
}

impl Default for ScoreTrend {
    fn default() -> Self {
        Self::new(DEFAULT_TREND_WINDOW)
    }
}

impl ScoreTrend {
    /// Create a new trend with the specified window size
    pub fn new(window_size: usize) -> Self {
        Self {
            scores: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Push a newly computed score into the window
    pub fn push(&mut self, score: f64) {
        push_bounded(&mut self.scores, score, self.window_size);
    }

    /// Typical score over the window, `None` before any score is recorded
    pub fn reference_score(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        Some(rolling_average(&self.scores))
    }

    /// Number of scores currently in the window
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Load trend state from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize trend state to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn push_bounded(queue: &mut VecDeque<f64>, value: f64, window_size: usize) {
    queue.push_back(value);
    while queue.len() > window_size {
        queue.pop_front();
    }
}

fn rolling_average(queue: &VecDeque<f64>) -> f64 {
    let sum: f64 = queue.iter().sum();
    sum / queue.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resting(hr: f64) -> SensorMetrics {
        SensorMetrics {
            heart_rate: hr,
            hrv: 55.0,
            eda: 2.0,
        }
    }

    #[test]
    fn test_recorder_requires_minimum_samples() {
        let mut recorder = BaselineRecorder::default();
        for _ in 0..(MIN_CALIBRATION_SAMPLES - 1) {
            recorder.record(&resting(65.0)).unwrap();
        }

        assert!(matches!(
            recorder.baseline(),
            Err(EngineError::InsufficientSamples { .. })
        ));

        recorder.record(&resting(65.0)).unwrap();
        assert!(recorder.baseline().is_ok());
    }

    #[test]
    fn test_recorder_averages_channels() {
        let mut recorder = BaselineRecorder::default();
        for hr in [60.0, 62.0, 64.0, 66.0, 68.0, 70.0] {
            recorder.record(&resting(hr)).unwrap();
            recorder.record(&resting(hr)).unwrap();
        }

        let baseline = recorder.baseline().unwrap();
        assert!((baseline.baseline_hr - 65.0).abs() < 0.001);
        assert!((baseline.baseline_hrv - 55.0).abs() < 0.001);
        assert!((baseline.baseline_eda - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_recorder_window_rolls() {
        let mut recorder = BaselineRecorder::new(12);

        // 12 samples at 60, then 12 at 80 - only the 80s should remain
        for _ in 0..12 {
            recorder.record(&resting(60.0)).unwrap();
        }
        for _ in 0..12 {
            recorder.record(&resting(80.0)).unwrap();
        }

        assert_eq!(recorder.sample_count(), 12);
        let baseline = recorder.baseline().unwrap();
        assert!((baseline.baseline_hr - 80.0).abs() < 0.001);
    }

    #[test]
    fn test_recorder_rejects_bad_samples() {
        let mut recorder = BaselineRecorder::default();
        let bad = SensorMetrics {
            heart_rate: f64::NAN,
            hrv: 55.0,
            eda: 2.0,
        };
        assert!(recorder.record(&bad).is_err());
        assert_eq!(recorder.sample_count(), 0);
    }

    #[test]
    fn test_recorder_serialization_round_trip() {
        let mut recorder = BaselineRecorder::default();
        for _ in 0..MIN_CALIBRATION_SAMPLES {
            recorder.record(&resting(65.0)).unwrap();
        }

        let json = recorder.to_json().unwrap();
        let loaded = BaselineRecorder::from_json(&json).unwrap();
        assert_eq!(loaded.sample_count(), recorder.sample_count());
        assert_eq!(
            loaded.baseline().unwrap().baseline_hr,
            recorder.baseline().unwrap().baseline_hr
        );
    }

    #[test]
    fn test_trend_reference_score() {
        let mut trend = ScoreTrend::new(4);
        assert!(trend.reference_score().is_none());

        trend.push(50.0);
        trend.push(54.0);
        assert!((trend.reference_score().unwrap() - 52.0).abs() < 0.001);

        // Window of 4: pushing 3 more evicts the 50
        trend.push(60.0);
        trend.push(60.0);
        trend.push(60.0);
        assert_eq!(trend.len(), 4);
        assert!((trend.reference_score().unwrap() - 58.5).abs() < 0.001);
    }
}
