//! Assessment report encoding
//!
//! Wraps an assessment into a versioned JSON payload with producer and
//! provenance metadata, so downstream consumers can trace every score back
//! to the device, reading time, and engine build that produced it.

use crate::error::EngineError;
use crate::types::{
    Assessment, AssessmentPayload, BaselineMetrics, ReportProducer, ReportProvenance,
    SensorReading,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for producing assessment payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Wrap an assessment into a complete payload
    pub fn encode(
        &self,
        reading: &SensorReading,
        baseline: &BaselineMetrics,
        assessment: Assessment,
    ) -> AssessmentPayload {
        let computed_at = Utc::now();

        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            device_id: reading.device_id.clone(),
            observed_at_utc: reading.observed_at.to_rfc3339(),
            computed_at_utc: computed_at.to_rfc3339(),
        };

        AssessmentPayload {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            assessment,
            baseline: *baseline,
        }
    }

    /// Wrap and serialize to a JSON string
    pub fn encode_to_json(
        &self,
        reading: &SensorReading,
        baseline: &BaselineMetrics,
        assessment: Assessment,
    ) -> Result<String, EngineError> {
        let payload = self.encode(reading, baseline, assessment);
        serde_json::to_string_pretty(&payload).map_err(EngineError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChannelDeviations, SensorMetrics, StressStatus};

    fn make_reading() -> SensorReading {
        SensorReading {
            observed_at: Utc::now(),
            device_id: "band-7".to_string(),
            metrics: SensorMetrics {
                heart_rate: 88.0,
                hrv: 42.0,
                eda: 4.2,
            },
        }
    }

    fn make_assessment() -> Assessment {
        Assessment {
            score: 68.4,
            status: StressStatus::Rising,
            label: StressStatus::Rising.label().to_string(),
            percentage_increase: 36.8,
            reference_score: 50.0,
            deviations: ChannelDeviations {
                heart_rate: 0.35,
                hrv: 0.24,
                eda: 1.1,
                weighted: 0.445,
            },
        }
    }

    fn make_baseline() -> BaselineMetrics {
        BaselineMetrics {
            baseline_hr: 65.0,
            baseline_hrv: 55.0,
            baseline_eda: 2.0,
        }
    }

    #[test]
    fn test_encode_payload() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let payload = encoder.encode(&make_reading(), &make_baseline(), make_assessment());

        assert_eq!(payload.report_version, REPORT_VERSION);
        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.producer.version, ENGINE_VERSION);
        assert_eq!(payload.producer.instance_id, "test-instance");

        assert_eq!(payload.provenance.device_id, "band-7");
        assert_eq!(payload.assessment.status, StressStatus::Rising);
        assert_eq!(payload.assessment.label, "Rising");
        assert_eq!(payload.baseline.baseline_hr, 65.0);
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = ReportEncoder::new();
        let json = encoder
            .encode_to_json(&make_reading(), &make_baseline(), make_assessment())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("report_version").is_some());
        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("provenance").is_some());
        assert_eq!(parsed["assessment"]["status"], "rising");
        assert_eq!(parsed["assessment"]["label"], "Rising");
    }
}
