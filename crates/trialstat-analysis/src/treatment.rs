//! Treatment labels and treatment column resolution
//!
//! The treatment factor is identified by matching the table's column names
//! against an ordered list of accepted aliases. The first alias that names a
//! column wins; resolution happens once, when a
//! [`TrialDataset`](crate::dataset::TrialDataset) is built.

use std::{cmp::Ordering, fmt};

use serde::Serialize;

use crate::{error::ConfigurationError, table::Cell, table::DataTable};

/// Column names accepted for the treatment factor, in priority order.
pub const DEFAULT_TREATMENT_ALIASES: &[&str] = &["mulch_rate", "treatment", "trt"];

/// One level of the treatment factor.
///
/// Numeric levels (application rates, doses) order numerically and sort
/// before text levels, which order lexicographically.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TreatmentLabel {
    Number(f64),
    Text(String),
}

impl TreatmentLabel {
    /// Label for a table cell, `None` for a missing cell.
    #[must_use]
    pub fn from_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Missing => None,
            Cell::Number(value) => Some(Self::from(*value)),
            Cell::Text(value) => Some(Self::Text(value.clone())),
        }
    }
}

impl From<&str> for TreatmentLabel {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<f64> for TreatmentLabel {
    /// `-0.0` and `0.0` are the same level.
    fn from(value: f64) -> Self {
        Self::Number(if value == 0.0 { 0.0 } else { value })
    }
}

impl fmt::Display for TreatmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => fmt::Display::fmt(value, f),
            Self::Text(value) => fmt::Display::fmt(value, f),
        }
    }
}

impl Ord for TreatmentLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for TreatmentLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TreatmentLabel {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TreatmentLabel {}

/// Ordered list of accepted treatment column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreatmentAliases {
    aliases: Vec<String>,
}

impl Default for TreatmentAliases {
    fn default() -> Self {
        Self::new(DEFAULT_TREATMENT_ALIASES.iter().copied())
    }
}

impl TreatmentAliases {
    pub fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Resolves the treatment column of a table.
    ///
    /// # Examples
    ///
    /// ```
    /// # use trialstat_analysis::{table::DataTable, treatment::TreatmentAliases};
    /// let table = DataTable::new(vec!["trt".into(), "treatment".into()], vec![]).unwrap();
    /// let column = TreatmentAliases::default().resolve(&table).unwrap();
    /// // "treatment" comes before "trt" in the alias list
    /// assert_eq!(column.name, "treatment");
    /// assert_eq!(column.index, 1);
    /// ```
    pub fn resolve(&self, table: &DataTable) -> Result<TreatmentColumn, ConfigurationError> {
        self.aliases
            .iter()
            .find_map(|alias| {
                table.column_index(alias).map(|index| TreatmentColumn {
                    index,
                    name: alias.clone(),
                })
            })
            .ok_or_else(|| ConfigurationError::NoTreatmentColumn {
                aliases: self.aliases.clone(),
            })
    }
}

/// Resolved treatment column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreatmentColumn {
    pub index: usize,
    pub name: String,
}
