//! Core types for the Glucose ET pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: glucose samples, mapped indices, step changes, classification and
//! the final analysis record.

use serde::{Deserialize, Serialize};

use crate::config::SAMPLE_COUNT;
use crate::error::ComputeError;

/// Meal impact status, ordered by severity (GREEN best, RED worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Green,
    Yellow,
    Red,
}

impl Status {
    /// All statuses from best to worst
    pub const ALL: [Status; 3] = [Status::Green, Status::Yellow, Status::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Green => "GREEN",
            Status::Yellow => "YELLOW",
            Status::Red => "RED",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Five glucose readings (mmol/L); index 0 is the pre-meal baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlucoseSamples([f64; SAMPLE_COUNT]);

impl GlucoseSamples {
    /// Build from a slice, rejecting anything other than exactly five finite values
    pub fn from_slice(values: &[f64]) -> Result<Self, ComputeError> {
        let samples: [f64; SAMPLE_COUNT] =
            values.try_into().map_err(|_| ComputeError::InvalidSampleCount {
                expected: SAMPLE_COUNT,
                actual: values.len(),
            })?;

        if let Some((index, &value)) = samples.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ComputeError::NonFiniteReading { index, value });
        }

        Ok(Self(samples))
    }

    pub fn values(&self) -> &[f64; SAMPLE_COUNT] {
        &self.0
    }

    /// Pre-meal reading
    pub fn baseline(&self) -> f64 {
        self.0[0]
    }
}

impl TryFrom<&[f64]> for GlucoseSamples {
    type Error = ComputeError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        Self::from_slice(values)
    }
}

/// Parallel T and E sequences produced by the index mapper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MappedIndices {
    /// Normalized time index, clamped to [0, 1]
    pub t: [f64; SAMPLE_COUNT],
    /// Energy-like index, 1 - T^2
    pub e: [f64; SAMPLE_COUNT],
}

/// Percentage change of E between consecutive samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepChanges {
    /// Entry 0 is always `None`; entry i is `None` when E[i-1] is zero
    pub deltas: [Option<f64>; SAMPLE_COUNT],
}

impl StepChanges {
    /// The four post-meal step changes (entries 1..4)
    pub fn steps(&self) -> &[Option<f64>] {
        &self.deltas[1..]
    }

    /// Additive sum of the defined steps
    pub fn net_shift(&self) -> f64 {
        self.steps().iter().flatten().sum()
    }

    /// Number of steps that could not be computed
    pub fn undefined_steps(&self) -> usize {
        self.steps().iter().filter(|s| s.is_none()).count()
    }
}

/// Classifier output: status plus the E aggregates it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub status: Status,
    pub reason: String,
    /// E at the pre-meal reading
    pub e_pre: f64,
    /// Minimum E over all readings
    pub e_min: f64,
    /// Mean E over all readings
    pub e_mean: f64,
    /// Mean E relative to pre-meal E (%)
    pub e_mean_rel: f64,
}

/// Complete result of analyzing one meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealAnalysis {
    pub status: Status,
    pub reason: String,
    /// Percentage deltas between consecutive readings; `None` when undefined
    pub step_changes: Vec<Option<f64>>,
    /// Sum of the defined step changes (%)
    pub net_shift: f64,
    pub undefined_steps: usize,
    pub e_pre: f64,
    pub e_min: f64,
    pub e_mean: f64,
    pub e_mean_rel: f64,
    pub guidance: String,
    pub glucose: [f64; SAMPLE_COUNT],
    pub t_index: [f64; SAMPLE_COUNT],
    pub e_index: [f64; SAMPLE_COUNT],
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// One labelled reading as echoed in a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportReading {
    pub label: String,
    pub time: Option<String>,
    pub glucose_mmol_l: f64,
}

/// Complete report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub model: String,
    pub computed_at_utc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_id: Option<String>,
    pub readings: Vec<ReportReading>,
    pub analysis: MealAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_require_exactly_five() {
        let four = GlucoseSamples::from_slice(&[4.0, 5.0, 6.0, 7.0]);
        assert!(matches!(
            four,
            Err(ComputeError::InvalidSampleCount { expected: 5, actual: 4 })
        ));

        let six = GlucoseSamples::try_from(&[4.0, 5.0, 6.0, 7.0, 8.0, 9.0][..]);
        assert!(matches!(
            six,
            Err(ComputeError::InvalidSampleCount { expected: 5, actual: 6 })
        ));

        let five = GlucoseSamples::from_slice(&[4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
        assert_eq!(five.baseline(), 4.0);
    }

    #[test]
    fn test_samples_reject_nan() {
        let result = GlucoseSamples::from_slice(&[4.0, f64::NAN, 6.0, 7.0, 8.0]);
        assert!(matches!(
            result,
            Err(ComputeError::NonFiniteReading { index: 1, .. })
        ));
    }

    #[test]
    fn test_status_ordering_and_serde() {
        assert!(Status::Green < Status::Yellow);
        assert!(Status::Yellow < Status::Red);
        assert_eq!(serde_json::to_string(&Status::Yellow).unwrap(), "\"YELLOW\"");
        let parsed: Status = serde_json::from_str("\"RED\"").unwrap();
        assert_eq!(parsed, Status::Red);
    }

    #[test]
    fn test_step_changes_skip_undefined() {
        let changes = StepChanges {
            deltas: [None, Some(-10.0), None, Some(5.0), Some(1.5)],
        };
        assert_eq!(changes.steps().len(), 4);
        assert_eq!(changes.undefined_steps(), 1);
        assert!((changes.net_shift() - (-3.5)).abs() < 1e-12);
    }
}
