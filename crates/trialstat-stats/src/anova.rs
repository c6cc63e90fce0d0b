//! One-way analysis of variance.
//!
//! Partitions the total variation of a response into the part explained by a
//! single categorical factor and the residual part, and tests the ratio of the
//! two mean squares against the F distribution.
//!
//! Undefined quantities are reported as `NaN` rather than as errors, the same
//! way the usual numerical stacks fill an ANOVA table: a single factor level,
//! zero residual degrees of freedom or a `0 / 0` mean square ratio all leave
//! `f_value` and `p_value` undefined. Callers decide what an undefined p-value
//! means for them.

use statrs::distribution::{ContinuousCDF as _, FisherSnedecor};

use crate::descriptive::DescriptiveStats;

/// One row of an ANOVA table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaRow {
    /// Sum of squares attributed to this source.
    pub sum_sq: f64,
    /// Degrees of freedom of this source.
    pub df: f64,
}

impl AnovaRow {
    /// Mean square, `NaN` when the row has no degrees of freedom.
    #[must_use]
    pub fn mean_sq(&self) -> f64 {
        if self.df > 0.0 {
            self.sum_sq / self.df
        } else {
            f64::NAN
        }
    }
}

/// One-way ANOVA table for a single factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaTable {
    /// Between-groups (factor) row.
    pub treatment: AnovaRow,
    /// Within-groups (residual) row.
    pub residual: AnovaRow,
    /// F statistic, `NaN` when undefined.
    pub f_value: f64,
    /// Upper-tail probability of `f_value`, `NaN` when undefined.
    pub p_value: f64,
}

impl AnovaTable {
    /// Computes the one-way ANOVA table for the given groups.
    ///
    /// Empty groups are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use trialstat_stats::anova::AnovaTable;
    /// let table = AnovaTable::one_way(&[&[1.0, 2.0, 3.0], &[7.0, 8.0, 9.0]]);
    /// assert_eq!(table.treatment.df, 1.0);
    /// assert_eq!(table.residual.df, 4.0);
    /// assert!(table.p_value < 0.01);
    ///
    /// // A single level cannot be tested
    /// let table = AnovaTable::one_way(&[&[1.0, 2.0, 3.0]]);
    /// assert!(table.p_value.is_nan());
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn one_way(groups: &[&[f64]]) -> Self {
        let stats = groups
            .iter()
            .filter_map(|values| DescriptiveStats::new(values.iter().copied()))
            .collect::<Vec<_>>();

        let total_count = stats.iter().map(|s| s.count).sum::<usize>();
        let grand_mean = if total_count == 0 {
            f64::NAN
        } else {
            stats.iter().map(|s| s.mean * s.count as f64).sum::<f64>() / total_count as f64
        };

        let treatment = AnovaRow {
            sum_sq: stats
                .iter()
                .map(|s| s.count as f64 * (s.mean - grand_mean).powi(2))
                .sum(),
            df: stats.len().saturating_sub(1) as f64,
        };
        let residual = AnovaRow {
            sum_sq: stats.iter().map(DescriptiveStats::sum_of_squares).sum(),
            df: total_count.saturating_sub(stats.len()) as f64,
        };

        let (f_value, p_value) = f_test(treatment, residual);
        Self {
            treatment,
            residual,
            f_value,
            p_value,
        }
    }
}

fn f_test(treatment: AnovaRow, residual: AnovaRow) -> (f64, f64) {
    if treatment.df <= 0.0 || residual.df <= 0.0 {
        return (f64::NAN, f64::NAN);
    }

    let ms_treatment = treatment.mean_sq();
    let ms_residual = residual.mean_sq();
    if ms_residual == 0.0 {
        // Perfectly separated groups: F diverges and the upper tail vanishes
        return if ms_treatment > 0.0 {
            (f64::INFINITY, 0.0)
        } else {
            (f64::NAN, f64::NAN)
        };
    }

    let f_value = ms_treatment / ms_residual;
    let p_value = FisherSnedecor::new(treatment.df, residual.df)
        .map_or(f64::NAN, |dist| dist.sf(f_value));
    (f_value, p_value)
}
