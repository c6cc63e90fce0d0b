/// Descriptive statistics summarizing one group of observations.
///
/// Variance and standard deviation use the sample (`n - 1`) denominator, the
/// convention trial reports use for error bars.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// Number of observations.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// Sample variance, `None` for fewer than two observations.
    pub variance: Option<f64>,
    /// Sample standard deviation, `None` for fewer than two observations.
    pub std_dev: Option<f64>,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from a set of values.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use trialstat_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
    /// assert_eq!(stats.count, 8);
    /// assert_eq!(stats.mean, 5.0);
    /// assert_eq!(stats.min, 2.0);
    /// assert_eq!(stats.max, 9.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        let count = values.len();
        if count == 0 {
            return None;
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = (count > 1).then(|| {
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64
        });
        let std_dev = variance.map(f64::sqrt);

        Some(Self {
            count,
            min,
            max,
            mean,
            variance,
            std_dev,
        })
    }

    /// Sum of squared deviations from the mean.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn sum_of_squares(&self) -> f64 {
        self.variance
            .map_or(0.0, |variance| variance * (self.count - 1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DescriptiveStats::new(Vec::new()).is_none());
    }

    #[test]
    fn test_single_value_has_no_spread() {
        let stats = DescriptiveStats::new([3.5]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 3.5);
        assert_eq!(stats.variance, None);
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.sum_of_squares(), 0.0);
    }

    #[test]
    fn test_sample_standard_deviation() {
        let stats = DescriptiveStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        // Sum of squared deviations is 32, divided by n - 1 = 7
        let expected = 32.0_f64 / 7.0;
        assert!((stats.variance.unwrap() - expected).abs() < 1e-12);
        assert!((stats.std_dev.unwrap() - expected.sqrt()).abs() < 1e-12);
        assert!((stats.sum_of_squares() - 32.0).abs() < 1e-9);
    }
}
