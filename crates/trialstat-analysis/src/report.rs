//! Result records and the report sink interface
//!
//! The orchestrator hands its results to a [`ReportSink`]: every analyzed
//! variable, a chart request for every significant one, every skipped
//! variable, and finally the flat [`AnalysisRecord`] sequence of the whole run.

use std::convert::Infallible;

use serde::Serialize;

use crate::{
    error::VariableError, grouping::GroupLabel, orchestrator::VariableAnalysis,
    treatment::TreatmentLabel,
};

/// One exported row: the mean and group code of one treatment for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub variable: String,
    pub treatment: TreatmentLabel,
    pub mean: f64,
    pub group_letter: GroupLabel,
}

/// Bar chart of treatment means annotated with their group letters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRequest {
    pub variable: String,
    pub treatment_column: String,
    pub bars: Vec<ChartBar>,
}

/// One bar: height is the mean, the error bar the standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub treatment: TreatmentLabel,
    pub height: f64,
    pub error: Option<f64>,
    pub annotation: GroupLabel,
}

impl ChartRequest {
    /// Chart title, e.g. `yield by mulch_rate`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} by {}", self.variable, self.treatment_column)
    }
}

impl ChartBar {
    /// Vertical position of the annotation, just above the bar.
    #[must_use]
    pub fn annotation_y(&self) -> f64 {
        self.height + 0.05 * self.height
    }
}

/// Receiver of analysis results.
pub trait ReportSink {
    type Error;

    /// Called once per successfully analyzed variable, in variable order.
    fn variable_analyzed(&mut self, analysis: &VariableAnalysis) -> Result<(), Self::Error>;

    /// Called after [`variable_analyzed`](Self::variable_analyzed) for significant variables.
    fn render_chart(&mut self, chart: &ChartRequest) -> Result<(), Self::Error>;

    /// Called for each variable that produced no records.
    fn variable_skipped(&mut self, error: &VariableError) -> Result<(), Self::Error> {
        let _ = error;
        Ok(())
    }

    /// Called once at the end of the run with all records, even when empty.
    fn finish(&mut self, records: &[AnalysisRecord]) -> Result<(), Self::Error>;
}

/// Sink that keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub analyses: Vec<VariableAnalysis>,
    pub charts: Vec<ChartRequest>,
    pub skipped: Vec<VariableError>,
    pub records: Vec<AnalysisRecord>,
    pub finished: bool,
}

impl ReportSink for MemorySink {
    type Error = Infallible;

    fn variable_analyzed(&mut self, analysis: &VariableAnalysis) -> Result<(), Self::Error> {
        self.analyses.push(analysis.clone());
        Ok(())
    }

    fn render_chart(&mut self, chart: &ChartRequest) -> Result<(), Self::Error> {
        self.charts.push(chart.clone());
        Ok(())
    }

    fn variable_skipped(&mut self, error: &VariableError) -> Result<(), Self::Error> {
        self.skipped.push(error.clone());
        Ok(())
    }

    fn finish(&mut self, records: &[AnalysisRecord]) -> Result<(), Self::Error> {
        self.records = records.to_vec();
        self.finished = true;
        Ok(())
    }
}
