//! Per-variable analysis driver
//!
//! For every response variable of a [`TrialDataset`] the orchestrator:
//!
//! 1. Drops rows missing the treatment label or the variable's value; a
//!    variable left without rows is skipped.
//! 2. Computes the [`MeansTable`].
//! 3. Runs the overall test and takes the significant branch only when its
//!    p-value is finite and below alpha.
//! 4. Significant: runs the pairwise tests on the same rows, assigns group
//!    letters and requests a chart.
//! 5. Otherwise: marks every treatment `-` without pairwise testing.
//!
//! Variables share no state, so they may be analyzed on separate threads;
//! results are always reported in column order.

use std::{fmt, thread};

use tracing::{info, warn};
use trialstat_stats::anova::AnovaTable;

use crate::{
    dataset::{ResponseVariable, TrialDataset},
    error::{ConfigurationError, VariableError},
    grouping::{
        self, DEFAULT_ALPHA, GroupingConfig, LetterAssignment, MissingPairPolicy, is_significant,
    },
    means::MeansTable,
    pairwise::PairwiseMatrix,
    provider::StatTestProvider,
    report::{AnalysisRecord, ChartBar, ChartRequest, ReportSink},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    /// Significance level for both the overall and the pairwise tests.
    pub alpha: f64,
    pub missing_pairs: MissingPairPolicy,
    /// Analyze variables on scoped threads.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            missing_pairs: MissingPairPolicy::default(),
            parallel: false,
        }
    }
}

impl AnalysisConfig {
    fn grouping(&self) -> GroupingConfig {
        GroupingConfig {
            alpha: self.alpha,
            missing_pairs: self.missing_pairs,
        }
    }
}

/// Result of the significance decision for one variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Significant {
        pairwise: PairwiseMatrix,
        letters: LetterAssignment,
    },
    NotSignificant {
        letters: LetterAssignment,
    },
}

/// Complete analysis of one response variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableAnalysis {
    pub variable: String,
    pub treatment_column: String,
    pub anova: AnovaTable,
    pub means: MeansTable,
    pub outcome: Outcome,
}

impl VariableAnalysis {
    #[must_use]
    pub fn is_significant(&self) -> bool {
        matches!(self.outcome, Outcome::Significant { .. })
    }

    #[must_use]
    pub fn letters(&self) -> &LetterAssignment {
        match &self.outcome {
            Outcome::Significant { letters, .. } | Outcome::NotSignificant { letters } => letters,
        }
    }

    #[must_use]
    pub fn pairwise(&self) -> Option<&PairwiseMatrix> {
        match &self.outcome {
            Outcome::Significant { pairwise, .. } => Some(pairwise),
            Outcome::NotSignificant { .. } => None,
        }
    }

    /// One record per treatment, in means table order.
    #[must_use]
    pub fn records(&self) -> Vec<AnalysisRecord> {
        let letters = self.letters();
        self.means
            .iter()
            .map(|entry| AnalysisRecord {
                variable: self.variable.clone(),
                treatment: entry.treatment.clone(),
                mean: entry.mean,
                group_letter: letters
                    .get(&entry.treatment)
                    .unwrap_or(grouping::GroupLabel::Ungrouped),
            })
            .collect()
    }

    /// Chart of the means with their letters; `None` when not significant.
    #[must_use]
    pub fn chart_request(&self) -> Option<ChartRequest> {
        if !self.is_significant() {
            return None;
        }
        let letters = self.letters();
        let bars = self
            .means
            .iter()
            .map(|entry| ChartBar {
                treatment: entry.treatment.clone(),
                height: entry.mean,
                error: entry.std_dev,
                annotation: letters
                    .get(&entry.treatment)
                    .unwrap_or(grouping::GroupLabel::Ungrouped),
            })
            .collect();
        Some(ChartRequest {
            variable: self.variable.clone(),
            treatment_column: self.treatment_column.clone(),
            bars,
        })
    }
}

/// Outcome of one variable, in or out of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableResult {
    pub variable: String,
    pub result: Result<VariableAnalysis, VariableError>,
}

/// A variable whose results the sink failed to take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFailure {
    pub variable: String,
    pub message: String,
}

/// Counts of a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub analyzed: usize,
    pub significant: usize,
    pub records: usize,
    pub skipped: Vec<VariableError>,
    /// Per-variable sink errors; the run continued past each of them.
    pub report_failures: Vec<ReportFailure>,
}

/// Drives the per-variable analysis of a dataset.
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator<P> {
    provider: P,
    config: AnalysisConfig,
}

impl<P> AnalysisOrchestrator<P>
where
    P: StatTestProvider,
{
    /// # Errors
    ///
    /// [`ConfigurationError::InvalidAlpha`] unless `0 < alpha < 1`.
    pub fn new(provider: P, config: AnalysisConfig) -> Result<Self, ConfigurationError> {
        if !(config.alpha > 0.0 && config.alpha < 1.0) {
            return Err(ConfigurationError::InvalidAlpha {
                alpha: config.alpha,
            });
        }
        Ok(Self { provider, config })
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes one response variable.
    ///
    /// # Errors
    ///
    /// * [`VariableError::NoValidRows`] - no row has both a treatment and a value
    /// * [`VariableError::Grouping`] - letters could not be assigned
    pub fn analyze_variable(
        &self,
        dataset: &TrialDataset,
        variable: &ResponseVariable,
    ) -> Result<VariableAnalysis, VariableError> {
        let samples = dataset.observations(variable);
        if samples.is_empty() {
            return Err(VariableError::NoValidRows {
                variable: variable.name.clone(),
            });
        }

        let means = MeansTable::from_samples(&samples);
        let anova = self.provider.overall_test(&samples);

        let outcome = if is_significant(anova.p_value, self.config.alpha) {
            info!(
                variable = %variable.name,
                p_value = anova.p_value,
                "significant treatment effect, running pairwise tests"
            );
            let pairwise = self.provider.pairwise_test(&samples);
            let letters = grouping::assign_letters(&means, &pairwise, &self.config.grouping())
                .map_err(|source| VariableError::Grouping {
                    variable: variable.name.clone(),
                    source,
                })?;
            Outcome::Significant { pairwise, letters }
        } else {
            info!(
                variable = %variable.name,
                p_value = anova.p_value,
                "no significant treatment effect"
            );
            Outcome::NotSignificant {
                letters: LetterAssignment::ungrouped(&means),
            }
        };

        Ok(VariableAnalysis {
            variable: variable.name.clone(),
            treatment_column: dataset.treatment_column().name.clone(),
            anova,
            means,
            outcome,
        })
    }
}

impl<P> AnalysisOrchestrator<P>
where
    P: StatTestProvider + Sync,
{
    /// Analyzes every response variable, in column order.
    pub fn analyze_all(&self, dataset: &TrialDataset) -> Vec<VariableResult> {
        let analyze = |variable: &ResponseVariable| VariableResult {
            variable: variable.name.clone(),
            result: self.analyze_variable(dataset, variable),
        };

        if !self.config.parallel {
            return dataset.responses().iter().map(analyze).collect();
        }

        thread::scope(|s| {
            let handles = dataset
                .responses()
                .iter()
                .map(|variable| s.spawn(move || analyze(variable)))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }

    /// Analyzes every variable and reports the results to `sink`.
    ///
    /// Variable-level errors are logged, passed to
    /// [`ReportSink::variable_skipped`] and counted in the summary. A sink
    /// error while reporting one variable is logged and recorded in
    /// [`RunSummary::report_failures`]. Neither stops the run, and
    /// [`ReportSink::finish`] is always called with every record.
    ///
    /// # Errors
    ///
    /// Returns the error raised by [`ReportSink::finish`].
    pub fn run<S>(&self, dataset: &TrialDataset, sink: &mut S) -> Result<RunSummary, S::Error>
    where
        S: ReportSink,
        S::Error: fmt::Display,
    {
        let mut summary = RunSummary::default();
        let mut records = Vec::new();

        for VariableResult { variable, result } in self.analyze_all(dataset) {
            let reported = match result {
                Ok(analysis) => {
                    records.extend(analysis.records());
                    summary.analyzed += 1;
                    let chart = analysis.chart_request();
                    if chart.is_some() {
                        summary.significant += 1;
                    }
                    sink.variable_analyzed(&analysis).and_then(|()| {
                        chart
                            .as_ref()
                            .map_or(Ok(()), |chart| sink.render_chart(chart))
                    })
                }
                Err(error) => {
                    warn!(%variable, %error, "skipping variable");
                    let reported = sink.variable_skipped(&error);
                    summary.skipped.push(error);
                    reported
                }
            };

            if let Err(error) = reported {
                warn!(%variable, %error, "failed to report variable");
                summary.report_failures.push(ReportFailure {
                    variable,
                    message: error.to_string(),
                });
            }
        }

        summary.records = records.len();
        sink.finish(&records)?;
        Ok(summary)
    }
}
