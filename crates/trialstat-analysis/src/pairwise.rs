//! Pairwise p-value matrix between treatment levels.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::treatment::TreatmentLabel;

/// Symmetric, possibly partial, matrix of pairwise p-values.
///
/// A pair is stored once; lookups succeed in either argument order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairwiseMatrix {
    p_values: BTreeMap<(TreatmentLabel, TreatmentLabel), f64>,
}

/// One stored comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparison<'a> {
    pub first: &'a TreatmentLabel,
    pub second: &'a TreatmentLabel,
    pub p_value: f64,
}

impl PairwiseMatrix {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the p-value of a pair, replacing any earlier value.
    pub fn insert(&mut self, a: TreatmentLabel, b: TreatmentLabel, p_value: f64) {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.p_values.insert(key, p_value);
    }

    /// p-value between two treatments, `None` when the pair was not tested.
    ///
    /// # Examples
    ///
    /// ```
    /// # use trialstat_analysis::{pairwise::PairwiseMatrix, treatment::TreatmentLabel};
    /// let mut matrix = PairwiseMatrix::new();
    /// matrix.insert(TreatmentLabel::from("T2"), TreatmentLabel::from("T1"), 0.3);
    /// assert_eq!(matrix.get(&"T1".into(), &"T2".into()), Some(0.3));
    /// assert_eq!(matrix.get(&"T1".into(), &"T3".into()), None);
    /// ```
    #[must_use]
    pub fn get(&self, a: &TreatmentLabel, b: &TreatmentLabel) -> Option<f64> {
        let key = if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        self.p_values.get(&key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.p_values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.p_values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PairwiseComparison<'_>> {
        self.p_values
            .iter()
            .map(|((first, second), p_value)| PairwiseComparison {
                first,
                second,
                p_value: *p_value,
            })
    }
}

impl FromIterator<(TreatmentLabel, TreatmentLabel, f64)> for PairwiseMatrix {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (TreatmentLabel, TreatmentLabel, f64)>,
    {
        let mut matrix = Self::new();
        for (a, b, p_value) in iter {
            matrix.insert(a, b, p_value);
        }
        matrix
    }
}

impl Serialize for PairwiseMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}
