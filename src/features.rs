//! Step-change derivation
//!
//! This module derives the relative Bio-Time shift between consecutive
//! readings: the percentage change of E from one point to the next.

use tracing::warn;

use crate::config::SAMPLE_COUNT;
use crate::types::StepChanges;

/// Deriver for consecutive E step changes
pub struct StepChangeCalculator;

impl StepChangeCalculator {
    /// Derive step changes from the E sequence
    pub fn derive(e: &[f64; SAMPLE_COUNT]) -> StepChanges {
        let mut deltas = [None; SAMPLE_COUNT];

        for i in 1..SAMPLE_COUNT {
            deltas[i] = relative_change_pct(e[i - 1], e[i]);
            if deltas[i].is_none() {
                warn!(step = i, "previous E is zero, step change undefined");
            }
        }

        StepChanges { deltas }
    }
}

/// Percentage change from `previous` to `current`; `None` when `previous` is zero
fn relative_change_pct(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}
