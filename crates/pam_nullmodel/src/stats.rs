//! Streaming statistics over null-model values.
//!
//! [`RunningStats`] keeps Welford's running mean and sum of squared
//! deviations per component, so memory does not grow with the number of
//! randomizations. With an observed value it also counts, per component,
//! how often a randomized value exceeds it; the p-value is that count over
//! the number of values pushed.

use crate::error::StatsError;

/// How a randomized value is compared with the observed value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `|test| > |observed|` (two-tailed).
    #[default]
    Absolute,
    /// `test > observed` (one-tailed).
    Signed,
}

impl Comparison {
    /// Returns `true` if `test` counts as exceeding `observed`.
    #[inline]
    pub fn exceeds(&self, observed: f64, test: f64) -> bool {
        match self {
            Comparison::Absolute => test.abs() > observed.abs(),
            Comparison::Signed => test > observed,
        }
    }
}

/// Welford accumulator over fixed-length vectors of statistic values.
///
/// The length is fixed by the observed value, or otherwise by the first
/// pushed value.
///
/// # Examples
///
/// ```rust
/// use approx::assert_relative_eq;
/// use pam_nullmodel::stats::{Comparison, RunningStats};
///
/// let mut stats = RunningStats::with_observed(vec![2.5], Comparison::Signed);
/// for v in [1.0, 2.0, 3.0, 4.0] {
///     stats.push_scalar(v).unwrap();
/// }
///
/// assert_eq!(stats.count(), 4);
/// assert_relative_eq!(stats.mean()[0], 2.5);
/// assert_relative_eq!(stats.variance()[0], 5.0 / 3.0);
/// assert_relative_eq!(stats.p_values().unwrap()[0], 0.5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RunningStats {
    observed: Option<Vec<f64>>,
    comparison: Comparison,
    count: usize,
    mean: Vec<f64>,
    s_k: Vec<f64>,
    exceed_counts: Vec<usize>,
}

impl RunningStats {
    /// Creates an accumulator without an observed value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an accumulator that also tracks p-values against `observed`.
    pub fn with_observed(observed: Vec<f64>, comparison: Comparison) -> Self {
        let width = observed.len();
        Self {
            observed: Some(observed),
            comparison,
            count: 0,
            mean: vec![0.0; width],
            s_k: vec![0.0; width],
            exceed_counts: vec![0; width],
        }
    }

    /// The observed value, if any.
    pub fn observed(&self) -> Option<&[f64]> {
        self.observed.as_deref()
    }

    /// Comparison used for p-values.
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    fn width(&self) -> Option<usize> {
        match &self.observed {
            Some(observed) => Some(observed.len()),
            None if self.count > 0 => Some(self.mean.len()),
            None => None,
        }
    }

    /// Adds one value.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if `value` has a different length than the
    /// observed value or earlier values; the accumulator is unchanged.
    pub fn push(&mut self, value: &[f64]) -> Result<(), StatsError> {
        match self.width() {
            Some(expected) if expected != value.len() => {
                return Err(StatsError::ShapeMismatch {
                    expected,
                    actual: value.len(),
                });
            }
            Some(_) => {}
            None => {
                self.mean = vec![0.0; value.len()];
                self.s_k = vec![0.0; value.len()];
                self.exceed_counts = vec![0; value.len()];
            }
        }

        self.count += 1;
        let n = self.count as f64;
        for ((mean, s_k), &v) in self.mean.iter_mut().zip(&mut self.s_k).zip(value) {
            let previous = *mean;
            *mean = previous + (v - previous) / n;
            *s_k += (v - previous) * (v - *mean);
        }

        if let Some(observed) = &self.observed {
            for ((count, &o), &v) in self.exceed_counts.iter_mut().zip(observed).zip(value) {
                if self.comparison.exceeds(o, v) {
                    *count += 1;
                }
            }
        }
        Ok(())
    }

    /// Adds a single-component value.
    pub fn push_scalar(&mut self, value: f64) -> Result<(), StatsError> {
        self.push(&[value])
    }

    /// Adds several values in order, stopping at the first rejected one.
    pub fn extend<'a, I>(&mut self, values: I) -> Result<(), StatsError>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        values.into_iter().try_for_each(|v| self.push(v))
    }

    /// Number of values pushed.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Running mean per component.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Sample variance per component; zero with fewer than two values.
    pub fn variance(&self) -> Vec<f64> {
        if self.count < 2 {
            return vec![0.0; self.mean.len()];
        }
        let denom = (self.count - 1) as f64;
        self.s_k.iter().map(|s| s / denom).collect()
    }

    /// Sample standard deviation per component.
    pub fn std_dev(&self) -> Vec<f64> {
        self.variance().into_iter().map(f64::sqrt).collect()
    }

    /// Number of pushed values exceeding the observed value, per component.
    pub fn exceed_counts(&self) -> &[usize] {
        &self.exceed_counts
    }

    /// Fraction of pushed values exceeding the observed value, per component.
    ///
    /// # Errors
    ///
    /// Returns `NoObserved` without an observed value and `Empty` before the
    /// first push.
    pub fn p_values(&self) -> Result<Vec<f64>, StatsError> {
        if self.observed.is_none() {
            return Err(StatsError::NoObserved);
        }
        if self.count == 0 {
            return Err(StatsError::Empty);
        }
        let n = self.count as f64;
        Ok(self.exceed_counts.iter().map(|&c| c as f64 / n).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_mean_and_variance_by_hand() {
        let mut stats = RunningStats::new();
        stats
            .extend([&[2.0, 10.0][..], &[4.0, 10.0][..], &[9.0, 10.0][..]])
            .unwrap();
        assert_eq!(stats.count(), 3);
        assert_relative_eq!(stats.mean()[0], 5.0);
        assert_relative_eq!(stats.mean()[1], 10.0);
        // deviations -3, -1, 4: squares sum to 26
        assert_relative_eq!(stats.variance()[0], 13.0);
        assert_relative_eq!(stats.variance()[1], 0.0);
        assert_relative_eq!(stats.std_dev()[0], 13.0_f64.sqrt());
    }

    #[test]
    fn test_single_value_has_zero_variance() {
        let mut stats = RunningStats::new();
        stats.push_scalar(3.0).unwrap();
        assert_eq!(stats.variance(), vec![0.0]);
    }

    #[test]
    fn test_absolute_comparison() {
        let mut stats = RunningStats::with_observed(vec![-2.0, 1.0], Comparison::Absolute);
        stats.push(&[3.0, -0.5]).unwrap();
        stats.push(&[-1.0, -4.0]).unwrap();
        stats.push(&[-2.5, 1.0]).unwrap();
        stats.push(&[0.0, 2.0]).unwrap();
        assert_eq!(stats.exceed_counts(), &[2, 2]);
        let p = stats.p_values().unwrap();
        assert_relative_eq!(p[0], 0.5);
        assert_relative_eq!(p[1], 0.5);
    }

    #[test]
    fn test_signed_comparison() {
        let mut stats = RunningStats::with_observed(vec![-2.0], Comparison::Signed);
        for v in [3.0, -1.0, -2.5, -2.0] {
            stats.push_scalar(v).unwrap();
        }
        assert_relative_eq!(stats.p_values().unwrap()[0], 0.5);
    }

    #[test]
    fn test_shape_fixed_by_first_push() {
        let mut stats = RunningStats::new();
        stats.push(&[1.0, 2.0]).unwrap();
        assert_eq!(
            stats.push(&[1.0]),
            Err(StatsError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(stats.count(), 1);
    }

    #[test]
    fn test_shape_fixed_by_observed() {
        let mut stats = RunningStats::with_observed(vec![0.0; 3], Comparison::Signed);
        assert!(stats.push(&[1.0]).is_err());
        assert_eq!(stats.count(), 0);
    }

    #[test]
    fn test_p_values_errors() {
        assert_eq!(RunningStats::new().p_values(), Err(StatsError::NoObserved));
        let stats = RunningStats::with_observed(vec![1.0], Comparison::Absolute);
        assert_eq!(stats.p_values(), Err(StatsError::Empty));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Streaming mean and variance agree with the two-pass formulas.
        #[test]
        fn prop_matches_two_pass(values in prop::collection::vec(-1e3..1e3f64, 2..200)) {
            let mut stats = RunningStats::new();
            for &v in &values {
                stats.push_scalar(v).unwrap();
            }
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

            prop_assert!((stats.mean()[0] - mean).abs() < 1e-9 * (1.0 + mean.abs()));
            prop_assert!((stats.variance()[0] - var).abs() < 1e-7 * (1.0 + var));
        }
    }
}
