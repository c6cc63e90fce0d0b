//! JSON layout of the run report (`analysis_report.json`).

use chrono::{DateTime, Local};
use serde::Serialize;
use trialstat_analysis::{
    error::VariableError, grouping::GroupLabel, orchestrator::VariableAnalysis,
    treatment::TreatmentLabel,
};
use trialstat_stats::anova::{AnovaRow, AnovaTable};

pub const REPORT_TITLE: &str = "Crop Experiment ANOVA & LSD Report";

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub title: String,
    pub generated_at: DateTime<Local>,
    pub sheet: String,
    pub treatment_column: String,
    pub alpha: f64,
    pub variables: Vec<VariableReport>,
    pub skipped: Vec<SkippedVariable>,
}

impl AnalysisReport {
    pub fn new(sheet: &str, treatment_column: &str, alpha: f64) -> Self {
        Self {
            title: REPORT_TITLE.to_owned(),
            generated_at: Local::now(),
            sheet: sheet.to_owned(),
            treatment_column: treatment_column.to_owned(),
            alpha,
            variables: vec![],
            skipped: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableReport {
    pub variable: String,
    pub anova: Vec<AnovaRowReport>,
    pub significant: bool,
    /// Means with group letters, significant variables only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupRow>>,
    /// Chart file name relative to the report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
    /// Why the chart file could not be written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_error: Option<String>,
}

impl VariableReport {
    pub fn from_analysis(analysis: &VariableAnalysis) -> Self {
        let groups = analysis.is_significant().then(|| {
            let letters = analysis.letters();
            analysis
                .means
                .iter()
                .map(|entry| GroupRow {
                    treatment: entry.treatment.clone(),
                    count: entry.count,
                    mean: entry.mean,
                    std_dev: entry.std_dev,
                    group_letter: letters
                        .get(&entry.treatment)
                        .unwrap_or(GroupLabel::Ungrouped),
                })
                .collect()
        });

        Self {
            variable: analysis.variable.clone(),
            anova: AnovaRowReport::from_table(&analysis.treatment_column, &analysis.anova),
            significant: analysis.is_significant(),
            groups,
            chart: None,
            chart_error: None,
        }
    }
}

/// ANOVA table row; undefined values are `null`.
#[derive(Debug, Clone, Serialize)]
pub struct AnovaRowReport {
    pub source: String,
    pub df: f64,
    pub sum_sq: Option<f64>,
    pub mean_sq: Option<f64>,
    pub f_value: Option<f64>,
    pub p_value: Option<f64>,
}

impl AnovaRowReport {
    fn from_table(treatment_column: &str, table: &AnovaTable) -> Vec<Self> {
        let anova_row = |source: &str, row: &AnovaRow| Self {
            source: source.to_owned(),
            df: row.df,
            sum_sq: finite(row.sum_sq),
            mean_sq: finite(row.mean_sq()),
            f_value: None,
            p_value: None,
        };
        vec![
            Self {
                f_value: finite(table.f_value),
                p_value: finite(table.p_value),
                ..anova_row(treatment_column, &table.treatment)
            },
            anova_row("Residual", &table.residual),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupRow {
    pub treatment: TreatmentLabel,
    pub count: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub group_letter: GroupLabel,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedVariable {
    pub variable: String,
    pub reason: String,
}

impl From<&VariableError> for SkippedVariable {
    fn from(error: &VariableError) -> Self {
        Self {
            variable: error.variable().to_owned(),
            reason: error.to_string(),
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
