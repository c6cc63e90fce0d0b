//! Error types for the analysis pipeline
//!
//! Only [`ConfigurationError`] stops a run. [`VariableError`] is contained to
//! the response variable it occurred in; the orchestrator logs it, reports it
//! to the sink and continues with the remaining variables.

use crate::grouping::GroupingError;

/// Fatal problem with the input or the run configuration.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigurationError {
    #[display("No treatment column found (expected one of: {})", aliases.join(", "))]
    NoTreatmentColumn { aliases: Vec<String> },
    #[display("Sheet '{sheet}' not found (available: {})", available.join(", "))]
    UnknownSheet {
        sheet: String,
        available: Vec<String>,
    },
    #[display("No numeric response columns found besides treatment column '{treatment_column}'")]
    NoResponseVariables { treatment_column: String },
    #[display("Significance level must lie strictly between 0 and 1, got {alpha}")]
    InvalidAlpha { alpha: f64 },
    #[display("Row {row} has {len} cells but the header has {expected} columns")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },
}

/// Problem confined to the analysis of one response variable.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum VariableError {
    #[display("No valid rows for variable '{variable}'")]
    NoValidRows { variable: String },
    #[display("Letter grouping failed for variable '{variable}': {source}")]
    Grouping {
        variable: String,
        source: GroupingError,
    },
}

impl VariableError {
    /// Name of the response variable the error belongs to.
    #[must_use]
    pub fn variable(&self) -> &str {
        match self {
            Self::NoValidRows { variable } | Self::Grouping { variable, .. } => variable,
        }
    }
}
