//! Stress status classification
//!
//! Classifies a stress score against a reference score (the patient's
//! typical score, not the raw sensor baseline) into calm / rising / overload
//! using fixed percentage-increase thresholds. Each call is independent;
//! no transition state is kept between calls.

use crate::error::EngineError;
use crate::types::StressStatus;

/// Percentage increase at which the status becomes `Rising`
pub const RISING_THRESHOLD_PCT: f64 = 30.0;
/// Percentage increase at which the status becomes `Overload`
pub const OVERLOAD_THRESHOLD_PCT: f64 = 60.0;

/// Percentage increase of `score` over `reference_score`.
pub fn percentage_increase(score: f64, reference_score: f64) -> f64 {
    (score - reference_score) / reference_score * 100.0
}

/// Classify a stress score against a reference score.
///
/// Scores below the reference always classify as `Calm`. The thresholds are
/// inclusive: exactly +30% is `Rising`, exactly +60% is `Overload`.
///
/// Permissive surface: a zero reference divides to infinity or NaN and a NaN
/// comparison falls through to `Calm`. Use [`try_stress_status`] to reject
/// invalid references instead.
pub fn stress_status(score: f64, reference_score: f64) -> StressStatus {
    let increase = percentage_increase(score, reference_score);

    if increase >= OVERLOAD_THRESHOLD_PCT {
        StressStatus::Overload
    } else if increase >= RISING_THRESHOLD_PCT {
        StressStatus::Rising
    } else {
        StressStatus::Calm
    }
}

/// Validated classification: rejects non-positive or non-finite reference
/// scores and non-finite stress scores before classifying.
pub fn try_stress_status(score: f64, reference_score: f64) -> Result<StressStatus, EngineError> {
    if !score.is_finite() {
        return Err(EngineError::NonFiniteReading(format!(
            "stress score = {score}"
        )));
    }
    if !reference_score.is_finite() || reference_score <= 0.0 {
        return Err(EngineError::InvalidReference(format!(
            "reference score must be a positive finite number, got {reference_score}"
        )));
    }
    Ok(stress_status(score, reference_score))
}
