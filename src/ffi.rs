//! FFI bindings for Glucose ET
//!
//! This module provides C-compatible functions for calling the engine from other
//! languages. Strings are null-terminated; returned strings are allocated and
//! must be freed by the caller using `glucose_et_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::ReferenceBounds;
use crate::error::ComputeError;
use crate::pipeline::{analyze_meal, meal_to_report, MealAnalyzer};
use crate::types::MealAnalysis;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

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

/// Borrow `len` doubles from a caller-owned buffer
unsafe fn values_from_raw<'a>(values: *const f64, len: usize) -> Option<&'a [f64]> {
    if values.is_null() {
        return None;
    }
    Some(std::slice::from_raw_parts(values, len))
}

fn analysis_to_cstr(result: Result<MealAnalysis, ComputeError>) -> *mut c_char {
    match result.and_then(|analysis| serde_json::to_string(&analysis).map_err(ComputeError::from)) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze glucose readings and return the analysis as JSON.
///
/// # Safety
/// - `values` must point to at least `len` readable doubles.
/// - Returns a newly allocated string that must be freed with `glucose_et_free_string`.
/// - Returns NULL on error (including `len != 5`); call `glucose_et_last_error`
///   to get the error message.
#[no_mangle]
pub unsafe extern "C" fn glucose_et_analyze(values: *const f64, len: usize) -> *mut c_char {
    clear_last_error();

    let Some(values) = values_from_raw(values, len) else {
        set_last_error("Invalid values pointer");
        return ptr::null_mut();
    };

    analysis_to_cstr(analyze_meal(values))
}

/// Convert a glucose.meal_input.v1 JSON document into a report JSON payload.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `glucose_et_free_string`.
/// - Returns NULL on error; call `glucose_et_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn glucose_et_meal_to_report(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match meal_to_report(json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Analyzer API
// ============================================================================

/// Opaque handle to a MealAnalyzer
pub struct MealAnalyzerHandle {
    analyzer: MealAnalyzer,
}

/// Create an analyzer with custom reference bounds (mmol/L).
///
/// # Safety
/// - Returns a pointer to a newly allocated analyzer.
/// - Must be freed with `glucose_et_analyzer_free`.
/// - Returns NULL if the bounds are invalid.
#[no_mangle]
pub unsafe extern "C" fn glucose_et_analyzer_new(g_min: f64, g_max: f64) -> *mut MealAnalyzerHandle {
    clear_last_error();

    match ReferenceBounds::new(g_min, g_max) {
        Ok(bounds) => Box::into_raw(Box::new(MealAnalyzerHandle {
            analyzer: MealAnalyzer::with_bounds(bounds),
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an analyzer.
///
/// # Safety
/// - `analyzer` must be a valid pointer returned by `glucose_et_analyzer_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn glucose_et_analyzer_free(analyzer: *mut MealAnalyzerHandle) {
    if !analyzer.is_null() {
        drop(Box::from_raw(analyzer));
    }
}

/// Analyze glucose readings with an analyzer's bounds.
///
/// # Safety
/// - `analyzer` must be a valid pointer returned by `glucose_et_analyzer_new`.
/// - `values` must point to at least `len` readable doubles.
/// - Returns a newly allocated string that must be freed with `glucose_et_free_string`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn glucose_et_analyzer_analyze(
    analyzer: *const MealAnalyzerHandle,
    values: *const f64,
    len: usize,
) -> *mut c_char {
    clear_last_error();

    if analyzer.is_null() {
        set_last_error("Invalid analyzer pointer");
        return ptr::null_mut();
    }

    let Some(values) = values_from_raw(values, len) else {
        set_last_error("Invalid values pointer");
        return ptr::null_mut();
    };

    analysis_to_cstr((*analyzer).analyzer.analyze(values))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Glucose ET functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Glucose ET function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn glucose_et_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Glucose ET call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn glucose_et_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn glucose_et_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
