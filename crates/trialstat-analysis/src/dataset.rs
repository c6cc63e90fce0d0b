//! Trial dataset: a table with its treatment column resolved
//!
//! Response variables are the numeric columns other than the treatment
//! column. Each variable is filtered independently: a row missing the
//! treatment label or that variable's value is dropped for that variable only.

use std::collections::{BTreeMap, btree_map};

use crate::{
    error::ConfigurationError,
    table::DataTable,
    treatment::{TreatmentAliases, TreatmentColumn, TreatmentLabel},
};

/// A numeric response column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseVariable {
    pub index: usize,
    pub name: String,
}

/// A table whose treatment and response columns have been identified.
#[derive(Debug, Clone)]
pub struct TrialDataset {
    table: DataTable,
    treatment: TreatmentColumn,
    responses: Vec<ResponseVariable>,
}

impl TrialDataset {
    /// Resolves the treatment column and detects the response variables.
    ///
    /// # Errors
    ///
    /// * [`ConfigurationError::NoTreatmentColumn`] - no alias names a column
    /// * [`ConfigurationError::NoResponseVariables`] - no numeric column besides the treatment
    pub fn from_table(
        table: DataTable,
        aliases: &TreatmentAliases,
    ) -> Result<Self, ConfigurationError> {
        let treatment = aliases.resolve(&table)?;
        let responses = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != treatment.index && table.is_numeric_column(*index))
            .map(|(index, name)| ResponseVariable {
                index,
                name: name.clone(),
            })
            .collect::<Vec<_>>();

        if responses.is_empty() {
            return Err(ConfigurationError::NoResponseVariables {
                treatment_column: treatment.name,
            });
        }

        Ok(Self {
            table,
            treatment,
            responses,
        })
    }

    #[must_use]
    pub fn table(&self) -> &DataTable {
        &self.table
    }

    #[must_use]
    pub fn treatment_column(&self) -> &TreatmentColumn {
        &self.treatment
    }

    #[must_use]
    pub fn responses(&self) -> &[ResponseVariable] {
        &self.responses
    }

    /// Observations of one variable grouped by treatment, incomplete rows dropped.
    #[must_use]
    pub fn observations(&self, variable: &ResponseVariable) -> TreatmentSamples {
        self.table
            .rows()
            .iter()
            .filter_map(|row| {
                let label = TreatmentLabel::from_cell(&row[self.treatment.index])?;
                let value = row[variable.index].as_number()?;
                Some((label, value))
            })
            .collect()
    }
}

/// Observations of one response variable, grouped by treatment level.
///
/// Levels iterate in [`TreatmentLabel`] order; values keep row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreatmentSamples {
    groups: BTreeMap<TreatmentLabel, Vec<f64>>,
}

impl TreatmentSamples {
    pub fn push(&mut self, treatment: TreatmentLabel, value: f64) {
        self.groups.entry(treatment).or_default().push(value);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of treatment levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Number of observations across all levels.
    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn get(&self, treatment: &TreatmentLabel) -> Option<&[f64]> {
        self.groups.get(treatment).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TreatmentLabel, &[f64])> {
        self.groups
            .iter()
            .map(|(label, values)| (label, values.as_slice()))
    }

    pub fn treatments(&self) -> btree_map::Keys<'_, TreatmentLabel, Vec<f64>> {
        self.groups.keys()
    }
}

impl FromIterator<(TreatmentLabel, f64)> for TreatmentSamples {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (TreatmentLabel, f64)>,
    {
        let mut samples = Self::default();
        for (treatment, value) in iter {
            samples.push(treatment, value);
        }
        samples
    }
}
