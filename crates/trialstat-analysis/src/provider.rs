//! Statistical tests consumed by the orchestrator
//!
//! [`StatTestProvider`] is the seam between the grouping logic and the test
//! mathematics. [`ClassicalTests`] is the built-in implementation: a one-way
//! ANOVA for the overall effect and two-sample pooled t-tests between every
//! pair of treatments (unadjusted by default, like an LSD test).

use trialstat_stats::{adjust::Adjustment, anova::AnovaTable, ttest::TTest};

use crate::{dataset::TreatmentSamples, pairwise::PairwiseMatrix};

/// Source of overall and pairwise significance tests for one variable.
pub trait StatTestProvider {
    /// Tests the treatment effect on one variable.
    ///
    /// An undefined test is reported through a non-finite `p_value`.
    fn overall_test(&self, samples: &TreatmentSamples) -> AnovaTable;

    /// p-values between treatment pairs of one variable.
    ///
    /// The matrix may leave pairs out.
    fn pairwise_test(&self, samples: &TreatmentSamples) -> PairwiseMatrix;
}

impl<P> StatTestProvider for &P
where
    P: StatTestProvider + ?Sized,
{
    fn overall_test(&self, samples: &TreatmentSamples) -> AnovaTable {
        (**self).overall_test(samples)
    }

    fn pairwise_test(&self, samples: &TreatmentSamples) -> PairwiseMatrix {
        (**self).pairwise_test(samples)
    }
}

/// One-way ANOVA with pooled two-sample t-tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClassicalTests {
    pub adjustment: Adjustment,
}

impl ClassicalTests {
    #[must_use]
    pub fn new(adjustment: Adjustment) -> Self {
        Self { adjustment }
    }
}

impl StatTestProvider for ClassicalTests {
    fn overall_test(&self, samples: &TreatmentSamples) -> AnovaTable {
        let groups = samples.iter().map(|(_, values)| values).collect::<Vec<_>>();
        AnovaTable::one_way(&groups)
    }

    fn pairwise_test(&self, samples: &TreatmentSamples) -> PairwiseMatrix {
        let groups = samples.iter().collect::<Vec<_>>();
        let mut pairs = Vec::new();
        let mut p_values = Vec::new();
        for (i, (a, a_values)) in groups.iter().enumerate() {
            for (b, b_values) in &groups[i + 1..] {
                pairs.push((*a, *b));
                p_values.push(TTest::pooled(a_values, b_values).p_value);
            }
        }

        pairs
            .into_iter()
            .zip(self.adjustment.apply(&p_values))
            .map(|((a, b), p_value)| (a.clone(), b.clone(), p_value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treatment::TreatmentLabel;

    fn samples() -> TreatmentSamples {
        [
            ("A", [10.1, 9.8, 10.3]),
            ("B", [9.9, 10.0, 9.6]),
            ("C", [5.2, 4.8, 5.1]),
        ]
        .into_iter()
        .flat_map(|(t, values)| values.map(|v| (TreatmentLabel::from(t), v)))
        .collect()
    }

    #[test]
    fn test_overall_test() {
        let table = ClassicalTests::default().overall_test(&samples());
        assert_eq!(table.treatment.df, 2.0);
        assert_eq!(table.residual.df, 6.0);
        assert!(table.p_value < 0.001);
    }

    #[test]
    fn test_pairwise_covers_every_pair() {
        let matrix = ClassicalTests::default().pairwise_test(&samples());
        assert_eq!(matrix.len(), 3);

        let a = TreatmentLabel::from("A");
        let b = TreatmentLabel::from("B");
        let c = TreatmentLabel::from("C");
        assert!(matrix.get(&a, &b).unwrap() > 0.05);
        assert!(matrix.get(&a, &c).unwrap() < 0.05);
        assert!(matrix.get(&b, &c).unwrap() < 0.05);
    }

    #[test]
    fn test_pairwise_adjustment() {
        let raw = ClassicalTests::default().pairwise_test(&samples());
        let adjusted = ClassicalTests::new(Adjustment::Bonferroni).pairwise_test(&samples());

        for comparison in raw.iter() {
            let expected = (comparison.p_value * 3.0).min(1.0);
            let actual = adjusted.get(comparison.first, comparison.second).unwrap();
            assert!((actual - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_treatment() {
        let samples = [(TreatmentLabel::from("A"), 1.0), (TreatmentLabel::from("A"), 2.0)]
            .into_iter()
            .collect::<TreatmentSamples>();
        let provider = ClassicalTests::default();
        assert!(provider.overall_test(&samples).p_value.is_nan());
        assert!(provider.pairwise_test(&samples).is_empty());
    }
}
