//! Console tables for the analyze command
//!
//! Undefined statistics are printed as `-`.

use trialstat_analysis::{grouping::GroupLabel, orchestrator::VariableAnalysis};
use trialstat_stats::anova::{AnovaRow, AnovaTable};

/// Formats a statistic, `-` when it is not finite.
pub(super) fn format_value(value: f64, precision: usize) -> String {
    if value.is_finite() {
        format!("{value:.precision$}")
    } else {
        "-".to_owned()
    }
}

fn format_p_value(value: f64) -> String {
    if value.is_finite() && value < 1e-4 {
        "<0.0001".to_owned()
    } else {
        format_value(value, 4)
    }
}

fn print_anova_row(source: &str, row: &AnovaRow, f_value: &str, p_value: &str) {
    println!(
        "  {:<20} {:>6} {:>12} {:>12} {:>10} {:>10}",
        source,
        format_value(row.df, 0),
        format_value(row.sum_sq, 4),
        format_value(row.mean_sq(), 4),
        f_value,
        p_value,
    );
}

/// Print the one-way ANOVA table of a variable
pub(super) fn print_anova_table(treatment_column: &str, table: &AnovaTable) {
    println!(
        "  {:<20} {:>6} {:>12} {:>12} {:>10} {:>10}",
        "Source", "Df", "Sum Sq", "Mean Sq", "F value", "Pr(>F)",
    );
    // source(20) + df(6) + sum_sq(12) + mean_sq(12) + f(10) + p(10) + spaces(5)
    println!("  {}", "-".repeat(75));
    print_anova_row(
        treatment_column,
        &table.treatment,
        &format_value(table.f_value, 4),
        &format_p_value(table.p_value),
    );
    print_anova_row("Residual", &table.residual, "", "");
}

/// Print treatment means with their group letters
pub(super) fn print_group_table(analysis: &VariableAnalysis) {
    println!(
        "  {:<20} {:>6} {:>12} {:>12} {:>6}",
        analysis.treatment_column, "N", "Mean", "Std", "Group",
    );
    // treatment(20) + n(6) + mean(12) + std(12) + group(6) + spaces(4)
    println!("  {}", "-".repeat(60));
    let letters = analysis.letters();
    for entry in &analysis.means {
        let group = letters
            .get(&entry.treatment)
            .unwrap_or(GroupLabel::Ungrouped);
        println!(
            "  {:<20} {:>6} {:>12} {:>12} {:>6}",
            entry.treatment.to_string(),
            entry.count,
            format_value(entry.mean, 4),
            entry
                .std_dev
                .map_or_else(|| "-".to_owned(), |s| format_value(s, 4)),
            group.to_string(),
        );
    }
}

/// Print everything known about one analyzed variable
pub(super) fn print_variable(analysis: &VariableAnalysis) {
    println!("{}", analysis.variable);
    println!("{}", "=".repeat(analysis.variable.chars().count().max(3)));
    print_anova_table(&analysis.treatment_column, &analysis.anova);
    println!();
    if analysis.is_significant() {
        println!("Significant effect found → running pairwise test");
        print_group_table(analysis);
    } else {
        println!("No significant difference between treatments.");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(5.842_105, 4), "5.8421");
        assert_eq!(format_value(12.0, 0), "12");
        assert_eq!(format_value(f64::NAN, 4), "-");
        assert_eq!(format_value(f64::INFINITY, 4), "-");
    }

    #[test]
    fn test_format_p_value() {
        assert_eq!(format_p_value(0.016_917), "0.0169");
        assert_eq!(format_p_value(0.000_01), "<0.0001");
        assert_eq!(format_p_value(0.0), "<0.0001");
        assert_eq!(format_p_value(f64::NAN), "-");
    }
}
