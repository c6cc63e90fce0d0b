//! Two-sample Student t-test with pooled variance.
//!
//! This is the comparison behind an unadjusted LSD-style post-hoc test: each
//! pair of treatments is compared using only the observations of those two
//! treatments.

use statrs::distribution::{ContinuousCDF as _, StudentsT};

use crate::descriptive::DescriptiveStats;

/// Result of a two-sided two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    /// t statistic (`mean(a) - mean(b)` over its standard error).
    pub t: f64,
    /// Degrees of freedom (`n_a + n_b - 2`).
    pub df: f64,
    /// Two-sided p-value, `NaN` when undefined.
    pub p_value: f64,
}

impl TTest {
    /// Runs a pooled-variance t-test between two samples.
    ///
    /// The p-value is `NaN` when either sample is empty, there are no degrees
    /// of freedom, or both the mean difference and the pooled variance are zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use trialstat_stats::ttest::TTest;
    /// let test = TTest::pooled(&[1.0, 2.0, 3.0], &[7.0, 8.0, 9.0]);
    /// assert_eq!(test.df, 4.0);
    /// assert!(test.t < 0.0);
    /// assert!(test.p_value < 0.01);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn pooled(a: &[f64], b: &[f64]) -> Self {
        let undefined = |df| Self {
            t: f64::NAN,
            df,
            p_value: f64::NAN,
        };

        let (Some(a), Some(b)) = (
            DescriptiveStats::new(a.iter().copied()),
            DescriptiveStats::new(b.iter().copied()),
        ) else {
            return undefined(0.0);
        };

        let df = (a.count + b.count).saturating_sub(2) as f64;
        if df <= 0.0 {
            return undefined(df);
        }

        let pooled_var = (a.sum_of_squares() + b.sum_of_squares()) / df;
        let std_err = (pooled_var * (1.0 / a.count as f64 + 1.0 / b.count as f64)).sqrt();
        let diff = a.mean - b.mean;

        if std_err == 0.0 {
            return if diff == 0.0 {
                undefined(df)
            } else {
                Self {
                    t: diff.signum() * f64::INFINITY,
                    df,
                    p_value: 0.0,
                }
            };
        }

        let t = diff / std_err;
        let p_value = StudentsT::new(0.0, 1.0, df).map_or(f64::NAN, |dist| 2.0 * dist.sf(t.abs()));
        Self {
            t,
            df,
            p_value: p_value.min(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_statistic() {
        // Means 2 and 8, pooled variance 1, standard error sqrt(2/3)
        let test = TTest::pooled(&[1.0, 2.0, 3.0], &[7.0, 8.0, 9.0]);
        let expected_t = -6.0 / (2.0_f64 / 3.0).sqrt();
        assert!((test.t - expected_t).abs() < 1e-12);
        assert_eq!(test.df, 4.0);
        assert!(test.p_value > 0.0 && test.p_value < 0.01);
    }

    #[test]
    fn test_symmetric_in_arguments() {
        let a = [5.1, 4.9, 5.6, 5.0];
        let b = [4.2, 4.8, 4.4];
        let ab = TTest::pooled(&a, &b);
        let ba = TTest::pooled(&b, &a);
        assert!((ab.t + ba.t).abs() < 1e-12);
        assert!((ab.p_value - ba.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_equal_means_give_p_one() {
        let test = TTest::pooled(&[1.0, 3.0], &[0.0, 4.0]);
        assert_eq!(test.t, 0.0);
        assert!((test.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(TTest::pooled(&[], &[1.0, 2.0]).p_value.is_nan());
        // One observation each leaves no degrees of freedom
        assert!(TTest::pooled(&[1.0], &[2.0]).p_value.is_nan());
        // No spread and no difference
        assert!(TTest::pooled(&[2.0, 2.0], &[2.0, 2.0]).p_value.is_nan());
    }

    #[test]
    fn test_no_spread_with_difference() {
        let test = TTest::pooled(&[2.0, 2.0], &[3.0, 3.0]);
        assert_eq!(test.p_value, 0.0);
        assert!(test.t.is_infinite() && test.t < 0.0);
    }
}
