//! Per-treatment means and standard deviations of one response variable.

use serde::Serialize;
use trialstat_stats::descriptive::DescriptiveStats;

use crate::{dataset::TreatmentSamples, treatment::TreatmentLabel};

/// Summary of one treatment level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatmentMean {
    pub treatment: TreatmentLabel,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, `None` for a single observation.
    pub std_dev: Option<f64>,
}

/// Treatment means of one response variable.
///
/// Entries keep their input order, which the letter grouping uses to break
/// ties between equal means.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MeansTable {
    entries: Vec<TreatmentMean>,
}

impl MeansTable {
    /// Summarizes grouped observations, in treatment label order.
    #[must_use]
    pub fn from_samples(samples: &TreatmentSamples) -> Self {
        let entries = samples
            .iter()
            .filter_map(|(treatment, values)| {
                let stats = DescriptiveStats::new(values.iter().copied())?;
                Some(TreatmentMean {
                    treatment: treatment.clone(),
                    count: stats.count,
                    mean: stats.mean,
                    std_dev: stats.std_dev,
                })
            })
            .collect();
        Self { entries }
    }

    /// Builds a table from bare means, in the given order.
    ///
    /// Repeated treatments keep their first mean.
    ///
    /// # Examples
    ///
    /// ```
    /// # use trialstat_analysis::{means::MeansTable, treatment::TreatmentLabel};
    /// let means = MeansTable::from_means([
    ///     (TreatmentLabel::from("T1"), 10.0),
    ///     (TreatmentLabel::from("T2"), 9.8),
    /// ]);
    /// assert_eq!(means.len(), 2);
    /// assert_eq!(means.get(&TreatmentLabel::from("T2")).unwrap().mean, 9.8);
    /// ```
    pub fn from_means<I>(means: I) -> Self
    where
        I: IntoIterator<Item = (TreatmentLabel, f64)>,
    {
        let mut table = Self::default();
        for (treatment, mean) in means {
            if table.get(&treatment).is_none() {
                table.entries.push(TreatmentMean {
                    treatment,
                    count: 0,
                    mean,
                    std_dev: None,
                });
            }
        }
        table
    }

    #[must_use]
    pub fn get(&self, treatment: &TreatmentLabel) -> Option<&TreatmentMean> {
        self.entries.iter().find(|entry| &entry.treatment == treatment)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TreatmentMean> {
        self.entries.iter()
    }

    pub fn treatments(&self) -> impl Iterator<Item = &TreatmentLabel> {
        self.entries.iter().map(|entry| &entry.treatment)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a MeansTable {
    type Item = &'a TreatmentMean;
    type IntoIter = std::slice::Iter<'a, TreatmentMean>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_samples() {
        let samples = [("B", 4.0), ("A", 1.0), ("B", 6.0), ("A", 3.0), ("C", 7.0)]
            .into_iter()
            .map(|(t, v)| (TreatmentLabel::from(t), v))
            .collect::<TreatmentSamples>();
        let means = MeansTable::from_samples(&samples);

        let rows = means
            .iter()
            .map(|m| (m.treatment.to_string(), m.count, m.mean, m.std_dev))
            .collect::<Vec<_>>();
        assert_eq!(
            rows,
            vec![
                ("A".to_owned(), 2, 2.0, Some(2.0_f64.sqrt())),
                ("B".to_owned(), 2, 5.0, Some(2.0_f64.sqrt())),
                ("C".to_owned(), 1, 7.0, None),
            ]
        );
    }

    #[test]
    fn test_from_means_keeps_order_and_first_duplicate() {
        let means = MeansTable::from_means([
            (TreatmentLabel::from("T2"), 1.0),
            (TreatmentLabel::from("T1"), 2.0),
            (TreatmentLabel::from("T2"), 3.0),
        ]);
        let treatments = means.treatments().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(treatments, ["T2", "T1"]);
        assert_eq!(means.get(&TreatmentLabel::from("T2")).unwrap().mean, 1.0);
    }
}
