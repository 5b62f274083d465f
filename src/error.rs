//! Error types for Glucose ET

use thiserror::Error;

use crate::schema::ValidationError;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid sample count: expected {expected} glucose readings, got {actual}")]
    InvalidSampleCount { expected: usize, actual: usize },

    #[error("Reading {index} is not a finite number: {value}")]
    NonFiniteReading { index: usize, value: f64 },

    #[error("Invalid reference bounds: g_min={g_min}, g_max={g_max}")]
    InvalidBounds { g_min: f64, g_max: f64 },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse meal input: {0}")]
    ParseError(String),

    #[error("Meal input failed validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
