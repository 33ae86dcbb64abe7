//! FFI bindings for Calmwave
//!
//! This module provides C-compatible functions for calling the engine from
//! mobile hosts. String-returning functions allocate memory that must be
//! freed by the caller using `calmwave_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::assess_reading;
use crate::score::stress_score;
use crate::status::stress_status;
use crate::types::{BaselineMetrics, SensorMetrics, StressStatus};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Compute a stress score from raw channel values.
///
/// Permissive arithmetic: a zero baseline or NaN input yields NaN, exactly
/// as the library's `stress_score`.
#[no_mangle]
pub extern "C" fn calmwave_stress_score(
    heart_rate: f64,
    hrv: f64,
    eda: f64,
    baseline_hr: f64,
    baseline_hrv: f64,
    baseline_eda: f64,
) -> f64 {
    let metrics = SensorMetrics {
        heart_rate,
        hrv,
        eda,
    };
    let baseline = BaselineMetrics {
        baseline_hr,
        baseline_hrv,
        baseline_eda,
    };
    stress_score(&metrics, &baseline)
}

/// Classify a stress score against a reference score.
///
/// Returns 0 (calm), 1 (rising), 2 (overload), or -1 for non-finite or
/// non-positive inputs.
#[no_mangle]
pub extern "C" fn calmwave_stress_status(score: f64, reference_score: f64) -> i32 {
    if !score.is_finite() || !reference_score.is_finite() || reference_score <= 0.0 {
        return -1;
    }
    match stress_status(score, reference_score) {
        StressStatus::Calm => 0,
        StressStatus::Rising => 1,
        StressStatus::Overload => 2,
    }
}

/// Assess a reading against a baseline and return the assessment as JSON.
///
/// # Safety
/// - `metrics_json` and `baseline_json` must be valid null-terminated C
///   strings holding `SensorMetrics` / `BaselineMetrics` JSON.
/// - Returns a newly allocated string that must be freed with
///   `calmwave_free_string`.
/// - Returns NULL on error; call `calmwave_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn calmwave_assess_json(
    metrics_json: *const c_char,
    baseline_json: *const c_char,
    reference_score: f64,
) -> *mut c_char {
    clear_last_error();

    let metrics_str = match cstr_to_string(metrics_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid metrics string pointer");
            return ptr::null_mut();
        }
    };

    let baseline_str = match cstr_to_string(baseline_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid baseline string pointer");
            return ptr::null_mut();
        }
    };

    let metrics: SensorMetrics = match serde_json::from_str(&metrics_str) {
        Ok(m) => m,
        Err(e) => {
            set_last_error(&format!("Failed to parse metrics: {e}"));
            return ptr::null_mut();
        }
    };

    let baseline: BaselineMetrics = match serde_json::from_str(&baseline_str) {
        Ok(b) => b,
        Err(e) => {
            set_last_error(&format!("Failed to parse baseline: {e}"));
            return ptr::null_mut();
        }
    };

    match assess_reading(&metrics, &baseline, reference_score) {
        Ok(assessment) => match serde_json::to_string(&assessment) {
            Ok(json) => string_to_cstr(&json),
            Err(e) => {
                set_last_error(&e.to_string());
                ptr::null_mut()
            }
        },
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the last error message, or NULL if none.
///
/// # Safety
/// The returned pointer is owned by thread-local storage and must NOT be
/// freed by the caller. It is valid until the next engine call on this
/// thread.
#[no_mangle]
pub unsafe extern "C" fn calmwave_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string previously returned by this library.
///
/// # Safety
/// `s` must be a pointer returned by a Calmwave FFI function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn calmwave_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
