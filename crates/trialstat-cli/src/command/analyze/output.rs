//! Report sink writing the run artifacts
//!
//! Every analyzed variable is printed to stdout as it arrives. Chart files
//! are written immediately; the results CSV and the JSON report are written
//! when the run finishes, even if every variable was skipped.

use std::{
    borrow::Cow,
    collections::HashSet,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use trialstat_analysis::{
    error::VariableError,
    orchestrator::VariableAnalysis,
    report::{AnalysisRecord, ChartRequest, ReportSink},
};

use super::table;
use crate::{
    schema::{
        chart::ChartFile,
        report::{AnalysisReport, SkippedVariable, VariableReport},
    },
    util,
};

pub(super) const RESULTS_FILE: &str = "analysis_results.csv";
pub(super) const REPORT_FILE: &str = "analysis_report.json";

#[derive(Debug)]
pub(super) struct ReportWriter {
    output_dir: PathBuf,
    report: AnalysisReport,
    written: Vec<PathBuf>,
    /// Lowercased chart stems already handed out.
    chart_stems: HashSet<String>,
}

impl ReportWriter {
    pub(super) fn new(
        output_dir: &Path,
        sheet: &str,
        treatment_column: &str,
        alpha: f64,
    ) -> anyhow::Result<Self> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;
        Ok(Self {
            output_dir: output_dir.to_owned(),
            report: AnalysisReport::new(sheet, treatment_column, alpha),
            written: vec![],
            chart_stems: HashSet::new(),
        })
    }

    /// Files written so far, in creation order.
    pub(super) fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Chart file name for a variable, numbered when the stem is taken.
    ///
    /// Stems are compared case-insensitively so names stay distinct on
    /// case-insensitive file systems.
    fn chart_file_name(&mut self, variable: &str) -> String {
        let base = util::file_stem(variable);
        let mut stem = base.clone();
        let mut suffix = 2;
        while !self.chart_stems.insert(stem.to_lowercase()) {
            stem = format!("{base}_{suffix}");
            suffix += 1;
        }
        format!("{stem}_chart.json")
    }

    fn write_results_csv(&mut self, records: &[AnalysisRecord]) -> anyhow::Result<()> {
        let csv_path = self.output_dir.join(RESULTS_FILE);
        let csv_content = results_csv(&self.report.treatment_column, records)?;
        fs::write(&csv_path, csv_content)
            .with_context(|| format!("Failed to write CSV file: {}", csv_path.display()))?;
        self.written.push(csv_path);
        Ok(())
    }

    fn write_report(&mut self) -> anyhow::Result<()> {
        let report_path = self.output_dir.join(REPORT_FILE);
        util::write_json_file("report", &self.report, &report_path)?;
        self.written.push(report_path);
        Ok(())
    }
}

impl ReportSink for ReportWriter {
    type Error = anyhow::Error;

    fn variable_analyzed(&mut self, analysis: &VariableAnalysis) -> Result<(), Self::Error> {
        table::print_variable(analysis);
        self.report
            .variables
            .push(VariableReport::from_analysis(analysis));
        Ok(())
    }

    fn render_chart(&mut self, chart: &ChartRequest) -> Result<(), Self::Error> {
        let file_name = self.chart_file_name(&chart.variable);
        let chart_path = self.output_dir.join(&file_name);
        let result = util::write_json_file("chart", &ChartFile::from(chart), &chart_path);

        if let Some(report) = self
            .report
            .variables
            .iter_mut()
            .rev()
            .find(|report| report.variable == chart.variable)
        {
            match &result {
                Ok(()) => report.chart = Some(file_name),
                Err(error) => report.chart_error = Some(format!("{error:#}")),
            }
        }
        result?;

        println!("  Chart saved to: {}", chart_path.display());
        println!();
        self.written.push(chart_path);
        Ok(())
    }

    fn variable_skipped(&mut self, error: &VariableError) -> Result<(), Self::Error> {
        println!("Skipped: {error}");
        println!();
        self.report.skipped.push(SkippedVariable::from(error));
        Ok(())
    }

    fn finish(&mut self, records: &[AnalysisRecord]) -> Result<(), Self::Error> {
        self.write_results_csv(records)?;
        self.write_report()?;
        Ok(())
    }
}

/// Results table with one row per variable and treatment.
fn results_csv(treatment_column: &str, records: &[AnalysisRecord]) -> anyhow::Result<String> {
    let mut csv_content = String::new();
    writeln!(
        &mut csv_content,
        "variable,{},mean,group_letter",
        csv_field(treatment_column)
    )?;
    for record in records {
        writeln!(
            &mut csv_content,
            "{},{},{},{}",
            csv_field(&record.variable),
            csv_field(&record.treatment.to_string()),
            record.mean,
            record.group_letter,
        )
        .with_context(|| format!("Failed to write CSV row for {}", record.variable))?;
    }
    Ok(csv_content)
}

/// Quotes a CSV field when it contains a delimiter, a quote or a line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use trialstat_analysis::{
        dataset::TrialDataset,
        orchestrator::{AnalysisConfig, AnalysisOrchestrator},
        provider::ClassicalTests,
        table::{Cell, DataTable},
        treatment::TreatmentAliases,
    };

    use super::*;

    fn dataset() -> TrialDataset {
        let rows = [
            (0.0, 2.1, 30.0),
            (0.0, 2.3, 31.0),
            (0.0, 2.2, 29.0),
            (20.0, 3.4, 30.5),
            (20.0, 3.6, 30.0),
            (20.0, 3.5, 29.5),
            (40.0, 3.5, 31.0),
            (40.0, 3.7, 29.0),
            (40.0, 3.6, 30.0),
        ]
        .into_iter()
        .map(|(rate, y, h)| vec![Cell::Number(rate), Cell::Number(y), Cell::Number(h), Cell::Missing])
        .collect();
        let columns = ["mulch_rate", "yield", "height", "notes"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        let table = DataTable::new(columns, rows).unwrap();
        TrialDataset::from_table(table, &TreatmentAliases::default()).unwrap()
    }

    fn run(dir: &Path) -> ReportWriter {
        let orchestrator =
            AnalysisOrchestrator::new(ClassicalTests::default(), AnalysisConfig::default())
                .unwrap();
        let mut writer = ReportWriter::new(dir, "Sheet1", "mulch_rate", 0.05).unwrap();
        orchestrator.run(&dataset(), &mut writer).unwrap();
        writer
    }

    #[test]
    fn test_results_csv() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path());

        let csv = fs::read_to_string(dir.path().join(RESULTS_FILE)).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "variable,mulch_rate,mean,group_letter");
        // yield: 20 and 40 share a letter, the control differs; height is flat
        assert_eq!(lines.len(), 7);
        assert!(lines[1].starts_with("yield,0,"));
        assert!(lines[1].ends_with(",b"));
        assert!(lines[2].ends_with(",a"));
        assert!(lines[3].ends_with(",a"));
        assert!(lines[4..].iter().all(|line| line.starts_with("height,")));
        assert!(lines[4..].iter().all(|line| line.ends_with(",-")));
    }

    #[test]
    fn test_report_and_chart_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = run(dir.path());

        let names = writer
            .written()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, ["yield_chart.json", RESULTS_FILE, REPORT_FILE]);

        let report: serde_json::Value =
            util::read_json_file("report", dir.path().join(REPORT_FILE)).unwrap();
        assert_eq!(report["title"], "Crop Experiment ANOVA & LSD Report");
        assert_eq!(report["sheet"], "Sheet1");
        assert_eq!(report["treatment_column"], "mulch_rate");
        assert_eq!(report["variables"][0]["variable"], "yield");
        assert_eq!(report["variables"][0]["significant"], true);
        assert_eq!(report["variables"][0]["chart"], "yield_chart.json");
        assert_eq!(report["variables"][0]["groups"][0]["group_letter"], "b");
        assert_eq!(report["variables"][1]["significant"], false);
        assert!(report["variables"][1].get("groups").is_none());
        assert_eq!(report["variables"][0]["anova"][1]["source"], "Residual");
        assert!(report["variables"][0]["anova"][1]["p_value"].is_null());
        // the all-missing column is a response variable with no valid rows
        assert_eq!(report["skipped"][0]["variable"], "notes");

        let chart: serde_json::Value =
            util::read_json_file("chart", dir.path().join("yield_chart.json")).unwrap();
        assert_eq!(chart["title"], "yield by mulch_rate");
        assert_eq!(chart["x_label"], "mulch_rate");
        assert_eq!(chart["bars"].as_array().unwrap().len(), 3);
        assert_eq!(chart["bars"][0]["treatment"], 0.0);
        let height = chart["bars"][0]["height"].as_f64().unwrap();
        let annotation_y = chart["bars"][0]["annotation_y"].as_f64().unwrap();
        assert!((annotation_y - height * 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_empty_run_still_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ReportWriter::new(dir.path(), "Sheet1", "trt", 0.05).unwrap();
        writer.finish(&[]).unwrap();

        let csv = fs::read_to_string(dir.path().join(RESULTS_FILE)).unwrap();
        assert_eq!(csv, "variable,trt,mean,group_letter\n");
        assert!(dir.path().join(REPORT_FILE).exists());
    }

    #[test]
    fn test_output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("run1");
        let mut writer = ReportWriter::new(&nested, "Sheet1", "trt", 0.05).unwrap();
        writer.finish(&[]).unwrap();
        assert!(nested.join(RESULTS_FILE).exists());
    }

    /// Every response column gets the same clearly separated yield values.
    fn significant_dataset(responses: &[&str]) -> TrialDataset {
        let yields = [(0.0, 2.1), (0.0, 2.3), (0.0, 2.2), (20.0, 3.4), (20.0, 3.6), (20.0, 3.5)];
        let rows = yields
            .into_iter()
            .map(|(rate, y)| {
                let mut row = vec![Cell::Number(rate)];
                row.extend(responses.iter().map(|_| Cell::Number(y)));
                row
            })
            .collect();
        let columns = std::iter::once("mulch_rate")
            .chain(responses.iter().copied())
            .map(str::to_owned)
            .collect();
        let table = DataTable::new(columns, rows).unwrap();
        TrialDataset::from_table(table, &TreatmentAliases::default()).unwrap()
    }

    #[test]
    fn test_colliding_chart_names_are_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator =
            AnalysisOrchestrator::new(ClassicalTests::default(), AnalysisConfig::default())
                .unwrap();
        let mut writer = ReportWriter::new(dir.path(), "Sheet1", "mulch_rate", 0.05).unwrap();
        let dataset = significant_dataset(&["plant height", "plant_height", "Plant_Height"]);
        orchestrator.run(&dataset, &mut writer).unwrap();

        let report: serde_json::Value =
            util::read_json_file("report", dir.path().join(REPORT_FILE)).unwrap();
        let charts = report["variables"]
            .as_array()
            .unwrap()
            .iter()
            .map(|variable| variable["chart"].as_str().unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(
            charts,
            [
                "plant_height_chart.json",
                "plant_height_2_chart.json",
                "Plant_Height_3_chart.json",
            ]
        );

        for (chart, variable) in charts.iter().zip(["plant height", "plant_height", "Plant_Height"]) {
            let chart: serde_json::Value =
                util::read_json_file("chart", dir.path().join(chart)).unwrap();
            assert_eq!(chart["title"], format!("{variable} by mulch_rate"));
        }
    }

    #[test]
    fn test_chart_failure_still_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        // a directory in the way of the chart file
        fs::create_dir(dir.path().join("yield_chart.json")).unwrap();

        let orchestrator =
            AnalysisOrchestrator::new(ClassicalTests::default(), AnalysisConfig::default())
                .unwrap();
        let mut writer = ReportWriter::new(dir.path(), "Sheet1", "mulch_rate", 0.05).unwrap();
        let summary = orchestrator
            .run(&significant_dataset(&["yield", "height"]), &mut writer)
            .unwrap();

        assert_eq!(summary.report_failures.len(), 1);
        assert_eq!(summary.report_failures[0].variable, "yield");
        assert!(dir.path().join(RESULTS_FILE).is_file());
        assert!(dir.path().join("height_chart.json").is_file());

        let report: serde_json::Value =
            util::read_json_file("report", dir.path().join(REPORT_FILE)).unwrap();
        assert!(report["variables"][0].get("chart").is_none());
        assert!(
            report["variables"][0]["chart_error"]
                .as_str()
                .unwrap()
                .starts_with("Failed to write chart file")
        );
        assert_eq!(report["variables"][1]["chart"], "height_chart.json");

        let csv = fs::read_to_string(dir.path().join(RESULTS_FILE)).unwrap();
        assert_eq!(csv.lines().count(), 5);
    }

    #[test]
    fn test_csv_field() {
        assert_eq!(csv_field("yield"), "yield");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
