//! Meal classification
//!
//! This module aggregates E over all five readings relative to the pre-meal
//! value and buckets the result into a status:
//! - GREEN: mean-relative E >= 90%
//! - YELLOW: 75% <= mean-relative E < 90%
//! - RED: mean-relative E < 75%
//!
//! Higher mean-relative E means less contraction of biological time.

use tracing::debug;

use crate::config::{GREEN_THRESHOLD_PCT, NEUTRAL_MEAN_REL_PCT, SAMPLE_COUNT, YELLOW_THRESHOLD_PCT};
use crate::types::{Classification, Status};

const GREEN_REASON: &str = "GREEN – mean Bio-Time level remains close to the pre-meal state; \
     the contraction of biological time over this meal is mild.";

const YELLOW_REASON: &str = "YELLOW – mean Bio-Time level is moderately reduced; \
     this meal consumes a noticeable fraction of regulatory time.";

const RED_REASON: &str = "RED – mean Bio-Time level is markedly reduced; \
     this meal compresses biological time and limits recovery windows.";

impl Status {
    /// Bucket a mean-relative E percentage. Lower band bounds are inclusive.
    pub fn from_mean_rel(e_mean_rel: f64) -> Status {
        if e_mean_rel >= GREEN_THRESHOLD_PCT {
            Status::Green
        } else if e_mean_rel >= YELLOW_THRESHOLD_PCT {
            Status::Yellow
        } else {
            Status::Red
        }
    }

    /// Fixed one-sentence rationale for the status
    pub fn reason(&self) -> &'static str {
        match self {
            Status::Green => GREEN_REASON,
            Status::Yellow => YELLOW_REASON,
            Status::Red => RED_REASON,
        }
    }
}

/// Classifier over an E sequence
pub struct Classifier;

impl Classifier {
    pub fn classify(e: &[f64; SAMPLE_COUNT]) -> Classification {
        let e_pre = e[0];
        let e_min = e.iter().copied().fold(f64::INFINITY, f64::min);
        let e_mean = e.iter().sum::<f64>() / SAMPLE_COUNT as f64;
        let e_mean_rel = mean_relative_pct(e_mean, e_pre);

        let status = Status::from_mean_rel(e_mean_rel);
        debug!(e_pre, e_min, e_mean, e_mean_rel, %status, "classified meal");

        Classification {
            status,
            reason: status.reason().to_string(),
            e_pre,
            e_min,
            e_mean,
            e_mean_rel,
        }
    }
}

/// Mean E as a percentage of pre-meal E.
///
/// A pre-meal E of zero means the baseline already sits at the upper reference
/// bound; that case is reported as neutral (100%) rather than undefined.
fn mean_relative_pct(e_mean: f64, e_pre: f64) -> f64 {
    if e_pre == 0.0 {
        debug!("pre-meal E is zero, using neutral mean-relative E");
        return NEUTRAL_MEAN_REL_PCT;
    }
    e_mean / e_pre * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(Status::from_mean_rel(GREEN_THRESHOLD_PCT), Status::Green);
        assert_eq!(Status::from_mean_rel(89.9999), Status::Yellow);
        assert_eq!(Status::from_mean_rel(YELLOW_THRESHOLD_PCT), Status::Yellow);
        assert_eq!(Status::from_mean_rel(74.9999), Status::Red);
        assert_eq!(Status::from_mean_rel(120.0), Status::Green);
        assert_eq!(Status::from_mean_rel(0.0), Status::Red);
    }

    #[test]
    fn test_aggregates() {
        let result = Classifier::classify(&[1.0, 0.9, 0.81, 0.9, 1.0]);

        assert_eq!(result.e_pre, 1.0);
        assert_eq!(result.e_min, 0.81);
        assert!((result.e_mean - 0.922).abs() < 1e-9);
        assert!((result.e_mean_rel - 92.2).abs() < 1e-9);
        assert_eq!(result.status, Status::Green);
        assert_eq!(result.reason, GREEN_REASON);
    }

    #[test]
    fn test_zero_baseline_is_neutral() {
        let result = Classifier::classify(&[0.0; SAMPLE_COUNT]);

        assert_eq!(result.e_pre, 0.0);
        assert_eq!(result.e_min, 0.0);
        assert_eq!(result.e_mean, 0.0);
        assert_eq!(result.e_mean_rel, NEUTRAL_MEAN_REL_PCT);
        assert_eq!(result.status, Status::Green);
    }

    #[test]
    fn test_status_depends_only_on_mean_relative_e() {
        // Different shapes, same mean (0.8) and same baseline (1.0)
        let flat = Classifier::classify(&[1.0, 0.75, 0.75, 0.75, 0.75]);
        let spiky = Classifier::classify(&[1.0, 0.5, 1.0, 0.5, 1.0]);

        assert!((flat.e_mean_rel - spiky.e_mean_rel).abs() < 1e-12);
        assert_eq!(flat.status, spiky.status);
        assert_eq!(flat.status, Status::Yellow);
        assert_ne!(flat.e_min, spiky.e_min);
    }

    #[test]
    fn test_red_band() {
        let result = Classifier::classify(&[1.0, 0.5, 0.5, 0.6, 0.7]);
        assert!((result.e_mean_rel - 66.0).abs() < 1e-9);
        assert_eq!(result.status, Status::Red);
        assert_eq!(result.reason, Status::Red.reason());
    }

    #[test]
    fn test_reasons_are_distinct_and_labelled() {
        for status in Status::ALL {
            assert!(status.reason().starts_with(status.as_str()));
        }
        assert_ne!(GREEN_REASON, YELLOW_REASON);
        assert_ne!(YELLOW_REASON, RED_REASON);
    }
}
