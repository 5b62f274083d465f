//! Report encoding
//!
//! This module wraps a meal analysis into a report payload with producer and
//! provenance metadata, and renders it as JSON or as a plain-text summary.

use std::fmt::Write as _;

use chrono::Utc;
use uuid::Uuid;

use crate::config::SAMPLE_LABELS;
use crate::error::ComputeError;
use crate::schema::MealInput;
use crate::types::{MealAnalysis, MealReport, ReportProducer, ReportReading};
use crate::{ENGINE_VERSION, MODEL_LABEL, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for meal reports
#[derive(Debug, Clone)]
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

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build a report; `input` supplies labels, times and the meal id when present
    pub fn encode(&self, analysis: MealAnalysis, input: Option<&MealInput>) -> MealReport {
        let readings = analysis
            .glucose
            .iter()
            .enumerate()
            .map(|(i, &glucose_mmol_l)| {
                let reading = input.and_then(|m| m.readings.get(i));
                ReportReading {
                    label: match input {
                        Some(m) => m.label(i),
                        None => SAMPLE_LABELS[i].to_string(),
                    },
                    time: reading.and_then(|r| r.time).map(|t| t.format("%H:%M").to_string()),
                    glucose_mmol_l,
                }
            })
            .collect();

        MealReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            model: MODEL_LABEL.to_string(),
            computed_at_utc: Utc::now().to_rfc3339(),
            meal_id: input.and_then(|m| m.meal_id.clone()),
            readings,
            analysis,
        }
    }

    /// Encode to compact JSON
    pub fn encode_to_json(&self, report: &MealReport) -> Result<String, ComputeError> {
        serde_json::to_string(report).map_err(ComputeError::JsonError)
    }

    /// Encode to pretty-printed JSON
    pub fn encode_to_json_pretty(&self, report: &MealReport) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(report).map_err(ComputeError::JsonError)
    }

    /// Render a plain-text summary of the report
    pub fn encode_to_text(&self, report: &MealReport) -> Result<String, ComputeError> {
        render_text(report).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

fn render_text(report: &MealReport) -> Result<String, std::fmt::Error> {
    let analysis = &report.analysis;
    let mut out = String::new();

    writeln!(out, "Relative Bio-Time Shift • Glucose Mode ({})", report.model)?;
    writeln!(out)?;

    let readings: Vec<String> = report
        .readings
        .iter()
        .map(|r| match &r.time {
            Some(time) => format!("{} {}: {:.1}", r.label, time, r.glucose_mmol_l),
            None => format!("{}: {:.1}", r.label, r.glucose_mmol_l),
        })
        .collect();
    writeln!(out, "Readings (mmol/L): {}", readings.join(", "))?;
    writeln!(out)?;

    writeln!(out, "Status: {}", analysis.status)?;
    writeln!(out)?;

    writeln!(out, "Relative Bio-Time Shift (% between points):")?;
    writeln!(out, "  {}", format_steps(&analysis.step_changes))?;
    writeln!(out, "Net Bio-Time Shift for this meal:")?;
    writeln!(
        out,
        "  {:+.1}% contraction (sum of ΔE/E between points)",
        analysis.net_shift
    )?;
    if analysis.undefined_steps > 0 {
        writeln!(
            out,
            "  ({} step(s) not computable: previous E is zero)",
            analysis.undefined_steps
        )?;
    }
    writeln!(out)?;

    writeln!(out, "{}", analysis.reason)?;
    writeln!(out)?;

    writeln!(out, "E–T Summary (mean-E anchoring):")?;
    writeln!(out, "- E at pre-meal: {:.3}", analysis.e_pre)?;
    writeln!(out, "- Minimum E during the meal: {:.3}", analysis.e_min)?;
    writeln!(out, "- Mean E over all points: {:.3}", analysis.e_mean)?;
    writeln!(out, "- Mean E relative to pre-meal: {:.1}%", analysis.e_mean_rel)?;
    writeln!(out)?;

    write!(out, "{}", analysis.guidance)?;

    Ok(out)
}

/// Steps joined by arrows, e.g. "-1.7% → -1.5% → +0.8% → +1.3%"
pub fn format_steps(steps: &[Option<f64>]) -> String {
    steps
        .iter()
        .map(|step| match step {
            Some(pct) => format!("{pct:+.1}%"),
            None => "n/a".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" → ")
}
