//! Stress score calculation
//!
//! Converts a sensor reading plus a personal resting baseline into a 0-100
//! stress score. Each channel contributes its relative deviation from
//! baseline; the weighted combination is compressed through tanh so
//! unbounded deviations still land inside the scale.

use crate::error::EngineError;
use crate::types::{BaselineMetrics, ChannelDeviations, SensorMetrics};

/// Heart-rate contribution to the weighted deviation
pub const HR_WEIGHT: f64 = 0.3;
/// HRV contribution (dominant signal)
pub const HRV_WEIGHT: f64 = 0.5;
/// EDA contribution
pub const EDA_WEIGHT: f64 = 0.2;

/// Gain applied to the weighted deviation before the tanh transform
pub const DEVIATION_GAIN: f64 = 2.0;

/// Score produced when the reading sits exactly at baseline
pub const MIDPOINT_SCORE: f64 = 50.0;

/// Compute per-channel relative deviations and their weighted combination.
///
/// Deviations are `|current - baseline| / baseline`, so direction is
/// discarded: readings above and below baseline score identically.
pub fn channel_deviations(
    metrics: &SensorMetrics,
    baseline: &BaselineMetrics,
) -> ChannelDeviations {
    let heart_rate = (metrics.heart_rate - baseline.baseline_hr).abs() / baseline.baseline_hr;
    let hrv = (metrics.hrv - baseline.baseline_hrv).abs() / baseline.baseline_hrv;
    let eda = (metrics.eda - baseline.baseline_eda).abs() / baseline.baseline_eda;

    ChannelDeviations {
        heart_rate,
        hrv,
        eda,
        weighted: heart_rate * HR_WEIGHT + hrv * HRV_WEIGHT + eda * EDA_WEIGHT,
    }
}

/// Calculate a stress score in [0, 100] from current readings and a baseline.
///
/// The transform is `(tanh(weighted_deviation * 2) + 1) * 50`, clamped to the
/// closed interval. Zero deviation on every channel yields exactly 50.
///
/// This is the permissive surface: a zero baseline or a NaN input flows
/// through the arithmetic and produces NaN rather than an error. Use
/// [`try_stress_score`] when invalid inputs should be rejected up front.
pub fn stress_score(metrics: &SensorMetrics, baseline: &BaselineMetrics) -> f64 {
    let deviations = channel_deviations(metrics, baseline);

    if deviations.weighted == 0.0 {
        // Exact midpoint for at-baseline readings, independent of any
        // floating-point wobble in tanh.
        return MIDPOINT_SCORE;
    }

    let compressed = (deviations.weighted * DEVIATION_GAIN).tanh();
    ((compressed + 1.0) * 50.0).clamp(0.0, 100.0)
}

/// Validated stress score: rejects non-positive or non-finite baselines and
/// non-finite readings before computing.
pub fn try_stress_score(
    metrics: &SensorMetrics,
    baseline: &BaselineMetrics,
) -> Result<f64, EngineError> {
    metrics.validate()?;
    baseline.validate()?;
    Ok(stress_score(metrics, baseline))
}
