//! Letter grouping of treatment means
//!
//! Converts treatment means and their pairwise p-values into letter codes:
//! treatments sharing a letter are not significantly different from each
//! other.
//!
//! # Algorithm
//!
//! Treatments are visited from the highest mean to the lowest; equal means
//! keep their [`MeansTable`] order. Each treatment joins the first existing
//! group (in letter order) whose every member it is compatible with, or opens
//! a new group under the next unused letter. Two treatments are compatible
//! unless a finite p-value below alpha separates them.
//!
//! Every treatment ends up with exactly one letter: the result is a
//! partition, not the overlapping cover a full compact letter display would
//! produce. Visiting order matters, so the procedure is greedy but fully
//! deterministic.
//!
//! # Untested pairs
//!
//! A pair with no entry in the [`PairwiseMatrix`] is resolved by
//! [`MissingPairPolicy`]. The default treats it as non-significant (p = 1),
//! which can place never-compared treatments under one letter.
//!
//! # Example
//!
//! ```
//! use trialstat_analysis::{
//!     grouping::{GroupLabel, GroupingConfig, assign_letters},
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
//! let letters = assign_letters(&means, &pairwise, &GroupingConfig::default()).unwrap();
//! assert_eq!(letters.get(&t("T1")), Some(GroupLabel::Letter('a')));
//! assert_eq!(letters.get(&t("T2")), Some(GroupLabel::Letter('a')));
//! assert_eq!(letters.get(&t("T3")), Some(GroupLabel::Letter('b')));
//! ```

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::{means::MeansTable, pairwise::PairwiseMatrix, treatment::TreatmentLabel};

/// Letters available for groups, in creation order.
pub const GROUP_LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";

/// Default significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Whether a p-value counts as a significant difference at `alpha`.
///
/// Undefined (non-finite) p-values are never significant.
#[must_use]
pub fn is_significant(p_value: f64, alpha: f64) -> bool {
    p_value.is_finite() && p_value < alpha
}

/// Group code of one treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupLabel {
    Letter(char),
    /// No grouping was performed for this variable.
    Ungrouped,
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Letter(letter) => fmt::Display::fmt(letter, f),
            Self::Ungrouped => f.write_str("-"),
        }
    }
}

impl Serialize for GroupLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// How to treat a pair of treatments missing from the pairwise matrix.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MissingPairPolicy {
    /// Assume p = 1: the pair may share a letter.
    #[default]
    AssumeNonSignificant,
    /// Assume the pair differs: it never shares a letter.
    AssumeSignificant,
    /// Report the missing comparison as an error.
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupingConfig {
    pub alpha: f64,
    pub missing_pairs: MissingPairPolicy,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            missing_pairs: MissingPairPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum GroupingError {
    #[display("Treatment {treatment} needs a new group but all {capacity} letters are in use")]
    LetterCapacity {
        treatment: TreatmentLabel,
        capacity: usize,
    },
    #[display("No pairwise comparison between {first} and {second}")]
    MissingComparison {
        first: TreatmentLabel,
        second: TreatmentLabel,
    },
}

/// A letter and the treatments assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LetterGroup {
    pub letter: char,
    pub members: Vec<TreatmentLabel>,
}

/// Ordered set of groups built during one grouping run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupRegistry {
    groups: Vec<LetterGroup>,
}

impl GroupRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups in creation order.
    #[must_use]
    pub fn groups(&self) -> &[LetterGroup] {
        &self.groups
    }

    /// Index of the first group every member of which is compatible with `treatment`.
    pub fn find_compatible(
        &self,
        treatment: &TreatmentLabel,
        pairwise: &PairwiseMatrix,
        config: &GroupingConfig,
    ) -> Result<Option<usize>, GroupingError> {
        for (index, group) in self.groups.iter().enumerate() {
            let mut compatible = true;
            for member in &group.members {
                if differs(treatment, member, pairwise, config)? {
                    compatible = false;
                    break;
                }
            }
            if compatible {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Adds `treatment` to an existing group and returns its letter.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn join(&mut self, index: usize, treatment: TreatmentLabel) -> char {
        let group = &mut self.groups[index];
        group.members.push(treatment);
        group.letter
    }

    /// Opens a group under the next unused letter with `treatment` as its first member.
    pub fn open(&mut self, treatment: TreatmentLabel) -> Result<char, GroupingError> {
        let Some(letter) = GROUP_LETTERS.chars().nth(self.groups.len()) else {
            return Err(GroupingError::LetterCapacity {
                treatment,
                capacity: GROUP_LETTERS.len(),
            });
        };
        self.groups.push(LetterGroup {
            letter,
            members: vec![treatment],
        });
        Ok(letter)
    }
}

fn differs(
    a: &TreatmentLabel,
    b: &TreatmentLabel,
    pairwise: &PairwiseMatrix,
    config: &GroupingConfig,
) -> Result<bool, GroupingError> {
    match (pairwise.get(a, b), config.missing_pairs) {
        (Some(p_value), _) => Ok(is_significant(p_value, config.alpha)),
        (None, MissingPairPolicy::AssumeNonSignificant) => Ok(false),
        (None, MissingPairPolicy::AssumeSignificant) => Ok(true),
        (None, MissingPairPolicy::Fail) => Err(GroupingError::MissingComparison {
            first: a.clone(),
            second: b.clone(),
        }),
    }
}

/// Group code of every treatment of one variable, in [`MeansTable`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct LetterAssignment {
    entries: Vec<(TreatmentLabel, GroupLabel)>,
}

impl LetterAssignment {
    /// Assignment marking every treatment as [`GroupLabel::Ungrouped`].
    #[must_use]
    pub fn ungrouped(means: &MeansTable) -> Self {
        Self {
            entries: means
                .treatments()
                .map(|treatment| (treatment.clone(), GroupLabel::Ungrouped))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, treatment: &TreatmentLabel) -> Option<GroupLabel> {
        self.entries
            .iter()
            .find(|(t, _)| t == treatment)
            .map(|(_, label)| *label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TreatmentLabel, GroupLabel)> {
        self.entries.iter().map(|(t, label)| (t, *label))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assigns a group letter to every treatment in `means`.
///
/// See the [module documentation](self) for the procedure.
///
/// # Errors
///
/// * [`GroupingError::LetterCapacity`] - more groups are needed than there are letters
/// * [`GroupingError::MissingComparison`] - a consulted pair is missing under
///   [`MissingPairPolicy::Fail`]
pub fn assign_letters(
    means: &MeansTable,
    pairwise: &PairwiseMatrix,
    config: &GroupingConfig,
) -> Result<LetterAssignment, GroupingError> {
    let mut order = means.iter().collect::<Vec<_>>();
    // Stable sort keeps table order between equal means
    order.sort_by(|a, b| b.mean.total_cmp(&a.mean));

    let mut registry = GroupRegistry::new();
    let mut letters = Vec::with_capacity(order.len());
    for entry in order {
        let treatment = entry.treatment.clone();
        let letter = match registry.find_compatible(&treatment, pairwise, config)? {
            Some(index) => registry.join(index, treatment.clone()),
            None => registry.open(treatment.clone())?,
        };
        debug!(%treatment, mean = entry.mean, %letter, "assigned group");
        letters.push((treatment, letter));
    }

    let entries = means
        .treatments()
        .map(|treatment| {
            let letter = letters
                .iter()
                .find(|(t, _)| t == treatment)
                .map_or(GroupLabel::Ungrouped, |(_, letter)| GroupLabel::Letter(*letter));
            (treatment.clone(), letter)
        })
        .collect();
    Ok(LetterAssignment { entries })
}
