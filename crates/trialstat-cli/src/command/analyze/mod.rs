//! Treatment-effect analysis command
//!
//! Loads one sheet of a spreadsheet or JSON workbook, runs a one-way ANOVA on every numeric
//! response column and, for significant ones, groups the treatment means
//! with pairwise tests. Prints the tables and writes the results CSV, the
//! JSON report and a chart file per significant variable.

mod output;
mod table;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use trialstat_analysis::{
    dataset::TrialDataset,
    grouping::{DEFAULT_ALPHA, MissingPairPolicy},
    orchestrator::{AnalysisConfig, AnalysisOrchestrator},
    provider::ClassicalTests,
    treatment::TreatmentAliases,
};
use trialstat_stats::adjust::Adjustment;

use self::output::ReportWriter;
use crate::{util, workbook};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    /// Path to the workbook (.xlsx, .xlsm, .xlsb, .xls, .ods, or JSON)
    pub workbook: PathBuf,

    /// Name of the sheet to analyze
    pub sheet: String,

    /// Significance level for the ANOVA and the pairwise tests
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,

    /// Accepted treatment column names, first match wins (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = ["mulch_rate", "treatment", "trt"])]
    pub treatment_aliases: Vec<String>,

    /// How to treat a pair of treatments without a pairwise p-value
    #[arg(long, value_enum, default_value_t = MissingPairs::AssumeNonSignificant)]
    pub missing_pairs: MissingPairs,

    /// Multiple-comparison adjustment of the pairwise p-values
    #[arg(long, value_enum, default_value_t = Adjust::None)]
    pub adjust: Adjust,

    /// Directory for the output files (default: the workbook's directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Analyze response variables in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Log per-variable progress to stderr
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum MissingPairs {
    AssumeNonSignificant,
    AssumeSignificant,
    Fail,
}

impl From<MissingPairs> for MissingPairPolicy {
    fn from(value: MissingPairs) -> Self {
        match value {
            MissingPairs::AssumeNonSignificant => Self::AssumeNonSignificant,
            MissingPairs::AssumeSignificant => Self::AssumeSignificant,
            MissingPairs::Fail => Self::Fail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Adjust {
    None,
    Bonferroni,
    Holm,
}

impl From<Adjust> for Adjustment {
    fn from(value: Adjust) -> Self {
        match value {
            Adjust::None => Self::None,
            Adjust::Bonferroni => Self::Bonferroni,
            Adjust::Holm => Self::Holm,
        }
    }
}

impl AnalyzeArg {
    fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            self.workbook
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default()
        })
    }

    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            alpha: self.alpha,
            missing_pairs: self.missing_pairs.into(),
            parallel: self.parallel,
        }
    }
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    util::init_tracing(arg.verbose);

    let orchestrator =
        AnalysisOrchestrator::new(ClassicalTests::new(arg.adjust.into()), arg.config())?;

    let table = workbook::load_sheet(&arg.workbook, &arg.sheet)
        .with_context(|| format!("Failed to load workbook: {}", arg.workbook.display()))?;
    let aliases = TreatmentAliases::new(arg.treatment_aliases.iter().cloned());
    let dataset = TrialDataset::from_table(table, &aliases)
        .with_context(|| format!("Failed to prepare sheet '{}'", arg.sheet))?;

    let treatment_column = &dataset.treatment_column().name;
    let title = format!("Treatment Effect Analysis ({} / {})", arg.sheet, treatment_column);
    println!("{title}");
    println!("{}\n", "=".repeat(title.chars().count()));
    println!(
        "Response variables: {}",
        dataset
            .responses()
            .iter()
            .map(|variable| variable.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Significance level: {}\n", arg.alpha);

    let mut writer = ReportWriter::new(&arg.output_dir(), &arg.sheet, treatment_column, arg.alpha)?;
    let summary = orchestrator.run(&dataset, &mut writer)?;

    println!(
        "Analyzed {} variable(s): {} significant, {} skipped",
        summary.analyzed,
        summary.significant,
        summary.skipped.len()
    );
    for path in writer.written() {
        println!("  Saved: {}", path.display());
    }
    for failure in &summary.report_failures {
        println!("  Not fully reported: {} ({})", failure.variable, failure.message);
    }

    if !summary.report_failures.is_empty() {
        anyhow::bail!(
            "{} variable(s) could not be fully reported",
            summary.report_failures.len()
        );
    }
    Ok(())
}
