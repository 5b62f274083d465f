//! Index mapping
//!
//! This module maps raw glucose readings onto the E–T plane:
//! - T: linear position between the reference bounds, clamped to 0-1
//! - E: 1 - T^2, higher when glucose sits closer to the lower bound

use crate::config::{ReferenceBounds, SAMPLE_COUNT};
use crate::types::{GlucoseSamples, MappedIndices};

/// Mapper from glucose readings to T and E indices
pub struct IndexMapper;

impl IndexMapper {
    /// Map all five readings against the given bounds
    pub fn map(samples: &GlucoseSamples, bounds: &ReferenceBounds) -> MappedIndices {
        let mut t = [0.0; SAMPLE_COUNT];
        let mut e = [0.0; SAMPLE_COUNT];

        for (i, &glucose) in samples.values().iter().enumerate() {
            t[i] = time_index(glucose, bounds);
            e[i] = energy_index(t[i]);
        }

        MappedIndices { t, e }
    }
}

/// Normalized time index of a single reading
pub fn time_index(glucose: f64, bounds: &ReferenceBounds) -> f64 {
    ((glucose - bounds.g_min()) / bounds.span()).clamp(0.0, 1.0)
}

/// Energy-like index for a time index
pub fn energy_index(t: f64) -> f64 {
    1.0 - t * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_G_MAX, DEFAULT_G_MIN};

    fn map_default(values: [f64; SAMPLE_COUNT]) -> MappedIndices {
        let samples = GlucoseSamples::from_slice(&values).unwrap();
        IndexMapper::map(&samples, &ReferenceBounds::default())
    }

    #[test]
    fn test_interior_values_strictly_inside_unit_range() {
        let mapped = map_default([3.1, 8.0, 12.5, 20.0, 24.9]);

        for i in 0..SAMPLE_COUNT {
            assert!(mapped.t[i] > 0.0 && mapped.t[i] < 1.0, "t[{i}] = {}", mapped.t[i]);
            assert!(mapped.e[i] > 0.0 && mapped.e[i] < 1.0, "e[{i}] = {}", mapped.e[i]);
        }
    }

    #[test]
    fn test_reference_bounds_map_exactly() {
        let mapped = map_default([DEFAULT_G_MIN, DEFAULT_G_MAX, DEFAULT_G_MIN, DEFAULT_G_MAX, DEFAULT_G_MIN]);

        assert_eq!(mapped.t, [0.0, 1.0, 0.0, 1.0, 0.0]);
        assert_eq!(mapped.e, [1.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_out_of_band_values_clamp() {
        let below = map_default([0.0, 1.5, 2.99, 0.0, 0.0]);
        assert!(below.t.iter().all(|&t| t == 0.0));
        assert!(below.e.iter().all(|&e| e == 1.0));

        let above = map_default([25.01, 30.0, 40.0, 100.0, 26.0]);
        assert!(above.t.iter().all(|&t| t == 1.0));
        assert!(above.e.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_clamp_is_idempotent_at_boundaries() {
        let bounds = ReferenceBounds::default();

        assert_eq!(time_index(1.0, &bounds), time_index(DEFAULT_G_MIN, &bounds));
        assert_eq!(time_index(35.0, &bounds), time_index(DEFAULT_G_MAX, &bounds));

        let first = map_default([2.0, 30.0, 2.0, 30.0, 2.0]);
        let second = map_default([DEFAULT_G_MIN, DEFAULT_G_MAX, DEFAULT_G_MIN, DEFAULT_G_MAX, DEFAULT_G_MIN]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_regression_fixture_indices() {
        let mapped = map_default([4.0, 6.0, 7.0, 6.5, 5.5]);
        let expected_t = [1.0 / 22.0, 3.0 / 22.0, 4.0 / 22.0, 3.5 / 22.0, 2.5 / 22.0];

        for i in 0..SAMPLE_COUNT {
            assert!((mapped.t[i] - expected_t[i]).abs() < 1e-12);
            assert!((mapped.e[i] - (1.0 - expected_t[i] * expected_t[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn test_custom_bounds() {
        let bounds = ReferenceBounds::new(4.0, 10.0).unwrap();
        assert!((time_index(7.0, &bounds) - 0.5).abs() < 1e-12);
        assert!((energy_index(0.5) - 0.75).abs() < 1e-12);
    }
}
