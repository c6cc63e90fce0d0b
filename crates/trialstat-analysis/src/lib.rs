//! Treatment-effect analysis for replicated field trials.
//!
//! Given a table of plots with a treatment column and numeric response
//! columns, this crate tests every response for a treatment effect and, when
//! the effect is significant, summarizes the pairwise comparisons as a
//! compact letter display: treatments sharing a letter are not significantly
//! different.
//!
//! # Pipeline
//!
//! ```text
//! Workbook / DataTable
//!     ↓ treatment alias resolution
//! TrialDataset (treatment column + response variables)
//!     ↓ per variable
//! TreatmentSamples → MeansTable
//!     ↓ overall test (StatTestProvider)
//! significant? ── no ──→ every treatment "-"
//!     ↓ yes
//! PairwiseMatrix → assign_letters → LetterAssignment + ChartRequest
//!     ↓
//! ReportSink (records, charts, skipped variables)
//! ```
//!
//! # Modules
//!
//! - [`table`]: Cells, sheets and workbooks as loaded from disk
//! - [`treatment`]: Treatment labels and treatment column resolution
//! - [`dataset`]: Response variable detection and per-variable row filtering
//! - [`means`]: Per-treatment means and standard deviations
//! - [`pairwise`]: Symmetric, possibly partial, pairwise p-value matrix
//! - [`grouping`]: Greedy compact letter display
//! - [`provider`]: Statistical test seam and the classical ANOVA/t-test provider
//! - [`orchestrator`]: Per-variable analysis driver
//! - [`report`]: Exported records, chart requests and the report sink interface
//! - [`error`]: Run-level and variable-level errors
//!
//! # Letter assignment
//!
//! Treatments are visited from the highest mean to the lowest. Each one
//! joins the earliest letter group whose every member it is compatible with,
//! or opens the next letter. Two treatments are compatible when their
//! p-value is not below alpha; undefined p-values count as compatible.
//!
//! ```
//! use trialstat_analysis::{
//!     grouping::{GroupingConfig, assign_letters},
//!     means::MeansTable,
//!     pairwise::PairwiseMatrix,
//!     treatment::TreatmentLabel,
//! };
//!
//! fn t(name: &str) -> TreatmentLabel {
//!     TreatmentLabel::from(name)
//! }
//!
//! let means = MeansTable::from_means([(t("T1"), 10.0), (t("T2"), 9.8), (t("T3"), 5.0)]);
//! let pairwise = PairwiseMatrix::from_iter([
//!     (t("T1"), t("T2"), 0.30),
//!     (t("T1"), t("T3"), 0.01),
//!     (t("T2"), t("T3"), 0.02),
//! ]);
//!
//! let letters = assign_letters(&means, &pairwise, &GroupingConfig::default())?;
//! let codes = letters.iter().map(|(_, label)| label.to_string()).collect::<Vec<_>>();
//! assert_eq!(codes, ["a", "a", "b"]);
//! # Ok::<(), trialstat_analysis::grouping::GroupingError>(())
//! ```

pub mod dataset;
pub mod error;
pub mod grouping;
pub mod means;
pub mod orchestrator;
pub mod pairwise;
pub mod provider;
pub mod report;
pub mod table;
pub mod treatment;
