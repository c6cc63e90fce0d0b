//! Multiple-comparison p-value adjustment.

/// Family-wise p-value adjustment applied to a set of pairwise comparisons.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Raw p-values.
    #[default]
    None,
    /// Bonferroni: `p * m`, capped at 1.
    Bonferroni,
    /// Holm step-down: Bonferroni applied to the ranked p-values, kept monotone.
    Holm,
}

impl Adjustment {
    /// Adjusts a family of p-values, preserving their order.
    ///
    /// `NaN` entries are passed through unchanged and do not count toward the
    /// family size.
    ///
    /// # Examples
    ///
    /// ```
    /// # use trialstat_stats::adjust::Adjustment;
    /// let adjusted = Adjustment::Bonferroni.apply(&[0.25, 0.125, 0.5]);
    /// assert_eq!(adjusted, vec![0.75, 0.375, 1.0]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn apply(self, p_values: &[f64]) -> Vec<f64> {
        let mut adjusted = p_values.to_vec();
        let mut ranked = p_values
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_nan())
            .map(|(i, p)| (i, *p))
            .collect::<Vec<_>>();
        let family = ranked.len() as f64;

        match self {
            Self::None => {}
            Self::Bonferroni => {
                for (i, p) in ranked {
                    adjusted[i] = (p * family).min(1.0);
                }
            }
            Self::Holm => {
                ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
                let mut running_max = 0.0_f64;
                for (rank, (i, p)) in ranked.into_iter().enumerate() {
                    let value = ((family - rank as f64) * p).min(1.0);
                    running_max = running_max.max(value);
                    adjusted[i] = running_max;
                }
            }
        }

        adjusted
    }
}
