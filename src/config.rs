//! Reference constants for the E–T mapping and classification bands
//!
//! Every number the engine relies on lives here so callers and tests can
//! refer to it by name.

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// Number of readings in one meal: pre-meal plus four post-meal points
pub const SAMPLE_COUNT: usize = 5;

/// Default display labels for the five readings
pub const SAMPLE_LABELS: [&str; SAMPLE_COUNT] = ["Pre", "+30m", "+60m", "+90m", "+120m"];

/// Minutes between consecutive readings in the default schedule
pub const SAMPLE_INTERVAL_MINUTES: i64 = 30;

/// Lower reference bound (mmol/L); maps to T = 0
pub const DEFAULT_G_MIN: f64 = 3.0;

/// Upper reference bound (mmol/L); maps to T = 1
pub const DEFAULT_G_MAX: f64 = 25.0;

/// Mean-relative E at or above this percentage is GREEN
pub const GREEN_THRESHOLD_PCT: f64 = 90.0;

/// Mean-relative E at or above this percentage (and below GREEN) is YELLOW
pub const YELLOW_THRESHOLD_PCT: f64 = 75.0;

/// Mean-relative E reported when the pre-meal E is zero
pub const NEUTRAL_MEAN_REL_PCT: f64 = 100.0;

/// Advisory input range enforced on meal input documents (mmol/L)
pub const GLUCOSE_INPUT_MIN: f64 = 0.0;
pub const GLUCOSE_INPUT_MAX: f64 = 40.0;

/// Lower and upper glucose reference bounds used by the index mapper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBounds {
    g_min: f64,
    g_max: f64,
}

impl Default for ReferenceBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ReferenceBounds {
    /// The 3.0 – 25.0 mmol/L band
    pub const DEFAULT: ReferenceBounds = ReferenceBounds {
        g_min: DEFAULT_G_MIN,
        g_max: DEFAULT_G_MAX,
    };

    /// Build custom bounds. `g_max` must be finite and strictly above `g_min`.
    pub fn new(g_min: f64, g_max: f64) -> Result<Self, ComputeError> {
        if !g_min.is_finite() || !g_max.is_finite() || g_max <= g_min {
            return Err(ComputeError::InvalidBounds { g_min, g_max });
        }
        Ok(Self { g_min, g_max })
    }

    pub fn g_min(&self) -> f64 {
        self.g_min
    }

    pub fn g_max(&self) -> f64 {
        self.g_max
    }

    /// Width of the reference band; never zero for a constructed value
    pub fn span(&self) -> f64 {
        self.g_max - self.g_min
    }
}
