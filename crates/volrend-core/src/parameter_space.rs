//! Sweepable parameter dimensions for automated experiments.

use crate::error::{Result, VolrendError};

/// Upper bound on the samples of a single dimension.
pub const MAX_RANGE_SAMPLES: usize = 1 << 20;

/// A float parameter swept from `min` to `max` in increments of `step`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRange {
    name: String,
    min: f32,
    max: f32,
    step: f32,
}

impl ParameterRange {
    /// Creates a range. Fails when a bound or the step is not finite, when
    /// `min > max`, when `step <= 0`, or when the range would hold more than
    /// [`MAX_RANGE_SAMPLES`] samples.
    #[allow(clippy::neg_cmp_op_on_partial_ord)] // NaN bounds must fail too
    pub fn new(name: impl Into<String>, min: f32, max: f32, step: f32) -> Result<Self> {
        let name = name.into();
        let finite = min.is_finite() && max.is_finite() && step.is_finite();
        if !finite
            || !(min <= max)
            || !(step > 0.0)
            || !(steps_between(min, max, step) < MAX_RANGE_SAMPLES as f32)
        {
            return Err(VolrendError::InvalidRange {
                name,
                min,
                max,
                step,
            });
        }
        Ok(Self {
            name,
            min,
            max,
            step,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Number of samples: every `min + i * step` that does not exceed `max`.
    pub fn sample_count(&self) -> usize {
        steps_between(self.min, self.max, self.step) as usize + 1
    }

    /// The sample values in increasing order.
    pub fn samples(&self) -> Vec<f32> {
        (0..self.sample_count())
            .map(|i| (self.min + i as f32 * self.step).min(self.max))
            .collect()
    }
}

fn steps_between(min: f32, max: f32, step: f32) -> f32 {
    // small epsilon so that e.g. [0, 1] step 0.1 includes 1.0
    ((max - min) / step + 1e-4).floor()
}

/// One point of a sweep: a value for every dimension, in dimension order.
pub type ParameterSample = Vec<(String, f32)>;

/// An ordered set of sweep dimensions.
#[derive(Debug, Clone, Default)]
pub struct ParameterSpace {
    dimensions: Vec<ParameterRange>,
}

impl ParameterSpace {
    /// Creates an empty parameter space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all dimensions.
    pub fn clear_dimensions(&mut self) {
        self.dimensions.clear();
    }

    /// Appends a dimension.
    pub fn add_dimension(&mut self, range: ParameterRange) {
        self.dimensions.push(range);
    }

    pub fn dimensions(&self) -> &[ParameterRange] {
        &self.dimensions
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Total number of sweep points (product of all dimension sizes).
    pub fn sample_count(&self) -> usize {
        if self.dimensions.is_empty() {
            return 0;
        }
        self.dimensions
            .iter()
            .map(ParameterRange::sample_count)
            .fold(1, usize::saturating_mul)
    }

    /// Enumerates the cartesian product of all dimensions. The last
    /// dimension varies fastest.
    pub fn samples(&self) -> Vec<ParameterSample> {
        if self.dimensions.is_empty() {
            return Vec::new();
        }
        let per_dim: Vec<Vec<f32>> = self.dimensions.iter().map(ParameterRange::samples).collect();
        let mut out: Vec<ParameterSample> = vec![Vec::new()];
        for (dim, values) in self.dimensions.iter().zip(&per_dim) {
            out = out
                .into_iter()
                .flat_map(|prefix| {
                    values.iter().map(move |&v| {
                        let mut s = prefix.clone();
                        s.push((dim.name.clone(), v));
                        s
                    })
                })
                .collect();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_step_size_dimension() {
        let range = ParameterRange::new("StepSize", 0.05, 3.0, 0.1).unwrap();
        let samples = range.samples();
        assert_eq!(samples.len(), 30);
        assert_eq!(samples[0], 0.05);
        assert!((samples[29] - 2.95).abs() < 1e-4);
        assert!(samples.iter().all(|&v| v <= 3.0));
    }

    #[test]
    fn test_range_includes_max_on_grid() {
        let range = ParameterRange::new("x", 0.0, 1.0, 0.1).unwrap();
        let samples = range.samples();
        assert_eq!(samples.len(), 11);
        assert!((samples[10] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_range() {
        let range = ParameterRange::new("x", 2.0, 2.0, 0.5).unwrap();
        assert_eq!(range.samples(), vec![2.0]);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(ParameterRange::new("x", 1.0, 0.0, 0.1).is_err());
        assert!(ParameterRange::new("x", 0.0, 1.0, 0.0).is_err());
        assert!(ParameterRange::new("x", f32::NAN, 1.0, 0.1).is_err());
    }

    #[test]
    fn test_unbounded_ranges_are_rejected() {
        assert!(ParameterRange::new("x", 0.0, f32::INFINITY, 1.0).is_err());
        assert!(ParameterRange::new("x", f32::NEG_INFINITY, 0.0, 1.0).is_err());
        assert!(ParameterRange::new("x", 0.0, 1.0, f32::INFINITY).is_err());
        assert!(ParameterRange::new("x", 0.0, 1.0e9, 1.0e-6).is_err());
        assert!(ParameterRange::new("x", f32::MIN, f32::MAX, 1.0).is_err());
    }

    #[test]
    fn test_largest_accepted_range() {
        let max = (MAX_RANGE_SAMPLES - 1) as f32;
        let range = ParameterRange::new("x", 0.0, max, 1.0).unwrap();
        assert_eq!(range.sample_count(), MAX_RANGE_SAMPLES);
        assert!(ParameterRange::new("x", 0.0, max + 1.0, 1.0).is_err());
    }

    #[test]
    fn test_cartesian_product() {
        let mut space = ParameterSpace::new();
        space.add_dimension(ParameterRange::new("a", 0.0, 1.0, 1.0).unwrap());
        space.add_dimension(ParameterRange::new("b", 0.0, 2.0, 1.0).unwrap());
        assert_eq!(space.sample_count(), 6);

        let samples = space.samples();
        assert_eq!(samples.len(), 6);
        assert_eq!(samples[0], vec![("a".to_string(), 0.0), ("b".to_string(), 0.0)]);
        assert_eq!(samples[1], vec![("a".to_string(), 0.0), ("b".to_string(), 1.0)]);
        assert_eq!(samples[5], vec![("a".to_string(), 1.0), ("b".to_string(), 2.0)]);
    }

    #[test]
    fn test_clear_dimensions() {
        let mut space = ParameterSpace::new();
        space.add_dimension(ParameterRange::new("a", 0.0, 1.0, 1.0).unwrap());
        space.clear_dimensions();
        assert!(space.is_empty());
        assert_eq!(space.sample_count(), 0);
        assert!(space.samples().is_empty());
    }

    proptest! {
        #[test]
        fn prop_accepted_ranges_are_bounded(
            min in -1.0e6f32..1.0e6,
            span in 0.0f32..1.0e6,
            step in 1.0e-3f32..1.0e3,
        ) {
            if let Ok(range) = ParameterRange::new("x", min, min + span, step) {
                prop_assert!(range.sample_count() <= MAX_RANGE_SAMPLES);
                prop_assert!(range.sample_count() >= 1);
            }
        }
    }
}
