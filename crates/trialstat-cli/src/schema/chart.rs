//! JSON layout of a chart file (`<variable>_chart.json`).

use serde::Serialize;
use trialstat_analysis::{grouping::GroupLabel, report::ChartRequest, treatment::TreatmentLabel};

/// Bar chart of treatment means with standard deviation error bars and group
/// letters written above the bars.
#[derive(Debug, Clone, Serialize)]
pub struct ChartFile {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<ChartBarFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartBarFile {
    pub treatment: TreatmentLabel,
    pub height: f64,
    pub error: Option<f64>,
    pub annotation: GroupLabel,
    pub annotation_y: f64,
}

impl From<&ChartRequest> for ChartFile {
    fn from(chart: &ChartRequest) -> Self {
        Self {
            title: chart.title(),
            x_label: chart.treatment_column.clone(),
            y_label: chart.variable.clone(),
            bars: chart
                .bars
                .iter()
                .map(|bar| ChartBarFile {
                    treatment: bar.treatment.clone(),
                    height: bar.height,
                    error: bar.error,
                    annotation: bar.annotation,
                    annotation_y: bar.annotation_y(),
                })
                .collect(),
        }
    }
}
