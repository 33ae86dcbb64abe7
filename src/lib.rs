//! Calmwave - On-device stress scoring engine for caregiver wearable monitoring
//!
//! Calmwave converts raw physiological readings (heart rate, HRV, EDA) plus a
//! per-patient resting baseline into a 0-100 stress score, then classifies the
//! score against the patient's typical score into calm / rising / overload.
//!
//! ## Modules
//!
//! - **score**: deviation-weighted sigmoid stress score
//! - **status**: percentage-increase status classification
//! - **calibration**: resting baseline construction and reference tracking
//! - **pipeline**: stateless and stateful assessment APIs
//! - **report**: versioned JSON payloads with producer/provenance metadata

pub mod calibration;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod score;
pub mod status;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use calibration::{BaselineRecorder, ScoreTrend};
pub use error::EngineError;
pub use pipeline::{assess_reading, StressProcessor};
pub use report::{ReportEncoder, REPORT_VERSION};
pub use score::{stress_score, try_stress_score};
pub use status::{stress_status, try_stress_status};
pub use types::{
    Assessment, AssessmentPayload, BaselineMetrics, ChannelDeviations, SensorMetrics,
    SensorReading, StressStatus,
};

/// Engine version embedded in all assessment payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for assessment payloads
pub const PRODUCER_NAME: &str = "calmwave";
