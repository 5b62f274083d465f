//! glucose.meal_input.v1 schema definitions

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::{
    GLUCOSE_INPUT_MAX, GLUCOSE_INPUT_MIN, SAMPLE_COUNT, SAMPLE_INTERVAL_MINUTES, SAMPLE_LABELS,
};

/// Current input schema version
pub const SCHEMA_VERSION: &str = "glucose.meal_input.v1";

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// One timestamped glucose reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Display label ("Pre", "+30m", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Wall-clock time the reading was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,

    /// Glucose concentration in mmol/L
    pub glucose_mmol_l: f64,
}

/// A meal's five readings as submitted by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealInput {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_id: Option<String>,

    pub readings: Vec<Reading>,
}

impl MealInput {
    /// Build an input document from bare values using the default labels and
    /// a half-hourly schedule starting at 18:00.
    pub fn from_values(values: &[f64]) -> Self {
        let start = NaiveTime::from_hms_opt(18, 0, 0);

        let readings = values
            .iter()
            .enumerate()
            .map(|(i, &glucose_mmol_l)| Reading {
                label: SAMPLE_LABELS.get(i).map(|l| l.to_string()),
                time: start.map(|t| t + Duration::minutes(SAMPLE_INTERVAL_MINUTES * i as i64)),
                glucose_mmol_l,
            })
            .collect();

        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            meal_id: None,
            readings,
        }
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Glucose values in reading order
    pub fn glucose_values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.glucose_mmol_l).collect()
    }

    /// Label for reading `index`, falling back to the default label
    pub fn label(&self, index: usize) -> String {
        self.readings
            .get(index)
            .and_then(|r| r.label.clone())
            .or_else(|| SAMPLE_LABELS.get(index).map(|l| l.to_string()))
            .unwrap_or_else(|| format!("#{index}"))
    }

    /// Validate the document, stopping at the first problem
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.validation_errors().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Collect every validation problem in the document
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.schema_version != SCHEMA_VERSION {
            errors.push(ValidationError::InvalidSchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        if self.readings.len() != SAMPLE_COUNT {
            errors.push(ValidationError::WrongReadingCount {
                expected: SAMPLE_COUNT,
                actual: self.readings.len(),
            });
        }

        for (index, reading) in self.readings.iter().enumerate() {
            let value = reading.glucose_mmol_l;
            if !value.is_finite() {
                errors.push(ValidationError::NonFinite { index });
            } else if !(GLUCOSE_INPUT_MIN..=GLUCOSE_INPUT_MAX).contains(&value) {
                errors.push(ValidationError::OutOfRange {
                    index,
                    value,
                    min: GLUCOSE_INPUT_MIN,
                    max: GLUCOSE_INPUT_MAX,
                });
            }
        }

        errors
    }
}

/// Validation errors for meal input documents
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Expected {expected} readings, got {actual}")]
    WrongReadingCount { expected: usize, actual: usize },

    #[error("Reading {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("Reading {index} is {value} mmol/L, outside the accepted range {min}-{max}")]
    OutOfRange {
        index: usize,
        value: f64,
        min: f64,
        max: f64,
    },
}
