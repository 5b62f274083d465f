//! Pipeline orchestration
//!
//! This module provides the public API for Glucose ET.
//! It runs five glucose readings through the full pipeline and, for the
//! document-based entry points, encodes the result as a report.

use tracing::debug;

use crate::classifier::Classifier;
use crate::config::ReferenceBounds;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::features::StepChangeCalculator;
use crate::guidance::guidance_for;
use crate::normalizer::IndexMapper;
use crate::schema::MealInput;
use crate::types::{GlucoseSamples, MealAnalysis, MealReport};

/// Analyze one meal against the default 3.0 – 25.0 mmol/L reference band.
///
/// # Arguments
/// * `glucose` - Exactly five readings in mmol/L, pre-meal first
///
/// # Example
/// ```ignore
/// let analysis = analyze_meal(&[4.0, 6.0, 7.0, 6.5, 5.5])?;
/// assert_eq!(analysis.status, Status::Green);
/// ```
pub fn analyze_meal(glucose: &[f64]) -> Result<MealAnalysis, ComputeError> {
    analyze_meal_with_bounds(glucose, &ReferenceBounds::default())
}

/// Analyze one meal against explicit reference bounds.
///
/// Pipeline stages:
/// 1. GlucoseSamples - Validate the sample count
/// 2. IndexMapper - Map glucose to T and E
/// 3. StepChangeCalculator - Consecutive E changes
/// 4. Classifier - Mean-relative E and status
/// 5. guidance_for - Advisory text
pub fn analyze_meal_with_bounds(
    glucose: &[f64],
    bounds: &ReferenceBounds,
) -> Result<MealAnalysis, ComputeError> {
    // Stage 1: Validate input
    let samples = GlucoseSamples::from_slice(glucose)?;

    // Stage 2: Map to E–T indices
    let indices = IndexMapper::map(&samples, bounds);
    debug!(t = ?indices.t, e = ?indices.e, "mapped glucose readings");

    // Stage 3: Step changes
    let changes = StepChangeCalculator::derive(&indices.e);

    // Stage 4: Classify
    let classification = Classifier::classify(&indices.e);

    // Stage 5: Guidance
    let guidance = guidance_for(classification.status);

    Ok(MealAnalysis {
        status: classification.status,
        reason: classification.reason,
        step_changes: changes.steps().to_vec(),
        net_shift: changes.net_shift(),
        undefined_steps: changes.undefined_steps(),
        e_pre: classification.e_pre,
        e_min: classification.e_min,
        e_mean: classification.e_mean,
        e_mean_rel: classification.e_mean_rel,
        guidance: guidance.to_string(),
        glucose: *samples.values(),
        t_index: indices.t,
        e_index: indices.e,
    })
}

/// Convert a glucose.meal_input.v1 JSON document into a report JSON payload.
///
/// # Example
/// ```ignore
/// let report_json = meal_to_report(input_json)?;
/// ```
pub fn meal_to_report(input_json: String) -> Result<String, ComputeError> {
    let analyzer = MealAnalyzer::new();
    let report = analyzer.report_from_json(&input_json)?;
    analyzer.encoder().encode_to_json_pretty(&report)
}

/// Reusable analyzer holding reference bounds and a report encoder.
///
/// Holds configuration only; no call changes what a later call computes.
#[derive(Debug, Clone, Default)]
pub struct MealAnalyzer {
    bounds: ReferenceBounds,
    encoder: ReportEncoder,
}

impl MealAnalyzer {
    /// Create an analyzer with the default reference bounds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with custom reference bounds
    pub fn with_bounds(bounds: ReferenceBounds) -> Self {
        Self {
            bounds,
            encoder: ReportEncoder::new(),
        }
    }

    pub fn bounds(&self) -> &ReferenceBounds {
        &self.bounds
    }

    pub fn encoder(&self) -> &ReportEncoder {
        &self.encoder
    }

    /// Analyze bare glucose values
    pub fn analyze(&self, glucose: &[f64]) -> Result<MealAnalysis, ComputeError> {
        analyze_meal_with_bounds(glucose, &self.bounds)
    }

    /// Validate an input document and build its report
    pub fn report(&self, input: &MealInput) -> Result<MealReport, ComputeError> {
        input.validate()?;
        let analysis = self.analyze(&input.glucose_values())?;
        Ok(self.encoder.encode(analysis, Some(input)))
    }

    /// Parse, validate and report a JSON input document
    pub fn report_from_json(&self, input_json: &str) -> Result<MealReport, ComputeError> {
        let input = MealInput::from_json(input_json)
            .map_err(|e| ComputeError::ParseError(e.to_string()))?;
        self.report(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NEUTRAL_MEAN_REL_PCT, SAMPLE_COUNT};
    use crate::schema::ValidationError;
    use crate::types::Status;
    use pretty_assertions::assert_eq;

    fn sample_input_json() -> &'static str {
        r#"{
            "schema_version": "glucose.meal_input.v1",
            "meal_id": "dinner",
            "readings": [
                { "label": "Pre", "time": "18:00:00", "glucose_mmol_l": 4.0 },
                { "label": "+30m", "time": "18:30:00", "glucose_mmol_l": 6.0 },
                { "label": "+60m", "time": "19:00:00", "glucose_mmol_l": 7.0 },
                { "label": "+90m", "time": "19:30:00", "glucose_mmol_l": 6.5 },
                { "label": "+120m", "time": "20:00:00", "glucose_mmol_l": 5.5 }
            ]
        }"#
    }

    #[test]
    fn test_regression_fixture() {
        let analysis = analyze_meal(&[4.0, 6.0, 7.0, 6.5, 5.5]).unwrap();

        assert_eq!(analysis.status, Status::Green);
        assert_eq!(analysis.reason, Status::Green.reason());
        assert!((analysis.e_pre - 483.0 / 484.0).abs() < 1e-12);
        assert!((analysis.e_min - 468.0 / 484.0).abs() < 1e-12);
        assert!((analysis.e_mean - 475.1 / 484.0).abs() < 1e-12);
        assert!((analysis.e_mean_rel - 98.364_389_233_954_45).abs() < 1e-9);

        let expected_steps = [
            -1.656_314_699_792_955,
            -1.473_684_210_526_316,
            0.801_282_051_282_05,
            1.271_860_095_389_514,
        ];
        assert_eq!(analysis.step_changes.len(), 4);
        for (step, expected) in analysis.step_changes.iter().zip(expected_steps) {
            assert!((step.unwrap() - expected).abs() < 1e-9);
        }
        assert!((analysis.net_shift - (-1.056_856_763_647_707)).abs() < 1e-9);
        assert_eq!(analysis.undefined_steps, 0);
    }

    #[test]
    fn test_yellow_meal() {
        let analysis = analyze_meal(&[10.0, 14.0, 16.0, 14.0, 12.0]).unwrap();
        assert!((analysis.e_mean_rel - 86.390_804_597_701_15).abs() < 1e-9);
        assert_eq!(analysis.status, Status::Yellow);
        assert!(analysis.guidance.contains("YELLOW patterns"));
    }

    #[test]
    fn test_red_meal() {
        let analysis = analyze_meal(&[8.0, 18.0, 22.0, 20.0, 16.0]).unwrap();
        assert!((analysis.e_mean_rel - 58.867_102_396_514_156).abs() < 1e-9);
        assert_eq!(analysis.status, Status::Red);
    }

    #[test]
    fn test_saturated_baseline_is_green() {
        let analysis = analyze_meal(&[25.0; SAMPLE_COUNT]).unwrap();

        assert_eq!(analysis.t_index, [1.0; SAMPLE_COUNT]);
        assert_eq!(analysis.e_index, [0.0; SAMPLE_COUNT]);
        assert_eq!(analysis.e_pre, 0.0);
        assert_eq!(analysis.e_mean_rel, NEUTRAL_MEAN_REL_PCT);
        assert_eq!(analysis.status, Status::Green);
        assert_eq!(analysis.step_changes, vec![None; 4]);
        assert_eq!(analysis.undefined_steps, 4);
        assert_eq!(analysis.net_shift, 0.0);
    }

    #[test]
    fn test_mid_meal_saturation_excludes_undefined_steps() {
        let analysis = analyze_meal(&[5.0, 25.0, 10.0, 30.0, 5.0]).unwrap();

        assert_eq!(analysis.step_changes[0], Some(-100.0));
        assert_eq!(analysis.step_changes[1], None);
        assert_eq!(analysis.step_changes[2], Some(-100.0));
        assert_eq!(analysis.step_changes[3], None);
        assert!((analysis.net_shift - (-200.0)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_lengths_rejected() {
        assert!(matches!(
            analyze_meal(&[4.0, 6.0, 7.0, 6.5]),
            Err(ComputeError::InvalidSampleCount { expected: 5, actual: 4 })
        ));
        assert!(matches!(
            analyze_meal(&[4.0, 6.0, 7.0, 6.5, 5.5, 5.0]),
            Err(ComputeError::InvalidSampleCount { expected: 5, actual: 6 })
        ));
        assert!(analyze_meal(&[]).is_err());
    }

    #[test]
    fn test_custom_bounds_analyzer() {
        let analyzer = MealAnalyzer::with_bounds(ReferenceBounds::new(4.0, 10.0).unwrap());
        let analysis = analyzer.analyze(&[4.0, 7.0, 7.0, 7.0, 7.0]).unwrap();

        // E = [1, 0.75, 0.75, 0.75, 0.75] -> mean 0.8
        assert!((analysis.e_mean_rel - 80.0).abs() < 1e-9);
        assert_eq!(analysis.status, Status::Yellow);
    }

    #[test]
    fn test_calls_are_independent() {
        let analyzer = MealAnalyzer::new();
        let first = analyzer.analyze(&[4.0, 6.0, 7.0, 6.5, 5.5]).unwrap();
        analyzer.analyze(&[8.0, 18.0, 22.0, 20.0, 16.0]).unwrap();
        let again = analyzer.analyze(&[4.0, 6.0, 7.0, 6.5, 5.5]).unwrap();

        assert_eq!(first, again);
    }

    #[test]
    fn test_meal_to_report() {
        let json = meal_to_report(sample_input_json().to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["report_version"], "1.0.0");
        assert_eq!(payload["producer"]["name"], "glucose-et");
        assert_eq!(payload["meal_id"], "dinner");
        assert_eq!(payload["readings"][4]["label"], "+120m");
        assert_eq!(payload["readings"][4]["time"], "20:00");
        assert_eq!(payload["analysis"]["status"], "GREEN");
        assert_eq!(payload["analysis"]["step_changes"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_report_rejects_out_of_range_document() {
        let input = MealInput::from_values(&[4.0, 6.0, 45.0, 6.5, 5.5]);
        let result = MealAnalyzer::new().report(&input);

        assert!(matches!(
            result,
            Err(ComputeError::Validation(ValidationError::OutOfRange { index: 2, .. }))
        ));
    }

    #[test]
    fn test_invalid_json() {
        let result = meal_to_report("not valid json".to_string());
        assert!(matches!(result, Err(ComputeError::ParseError(_))));
    }
}
