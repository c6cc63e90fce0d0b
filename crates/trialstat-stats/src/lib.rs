//! Statistical routines for replicated treatment trials.
//!
//! This crate provides the numerical building blocks used by the trial
//! analysis pipeline:
//!
//! - **Descriptive statistics**: count, mean, sample standard deviation
//! - **One-way ANOVA**: factor and residual sums of squares, F test
//! - **Two-sample t-test**: pooled-variance comparison of two treatments
//! - **p-value adjustment**: Bonferroni and Holm corrections for pairwise families
//!
//! Distribution functions come from [`statrs`].
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for one group of observations
//! - [`anova`]: One-way analysis of variance
//! - [`ttest`]: Pooled two-sample t-test
//! - [`adjust`]: Multiple-comparison adjustment
//!
//! # Examples
//!
//! ## Testing a treatment effect
//!
//! ```
//! use trialstat_stats::anova::AnovaTable;
//!
//! let control = [4.1, 4.4, 3.9];
//! let treated = [6.0, 6.3, 5.8];
//! let table = AnovaTable::one_way(&[&control, &treated]);
//! assert!(table.p_value < 0.05);
//! ```
//!
//! ## Comparing two treatments
//!
//! ```
//! use trialstat_stats::ttest::TTest;
//!
//! let test = TTest::pooled(&[4.1, 4.4, 3.9], &[6.0, 6.3, 5.8]);
//! assert!(test.p_value < 0.05);
//! ```

pub mod adjust;
pub mod anova;
pub mod descriptive;
pub mod ttest;
