//! Human-readable end-of-run summary.

use colored::Colorize;

use crate::output::table::CalibrationTable;
use crate::types::SessionOutcome;

/// Format the session result for the terminal.
///
/// A completed run gets a green header; an interrupted run keeps its
/// partial data but is flagged yellow. Per-channel coefficients follow,
/// with undefined fits called out.
pub fn format_summary(outcome: SessionOutcome, table: &CalibrationTable) -> String {
    let mut out = String::new();

    let header = match outcome {
        SessionOutcome::Completed { recorded } => format!(
            "{} {}",
            "\u{2713}".green().bold(),
            format!("CALIBRATION COMPLETE — {} points", recorded)
                .green()
                .bold()
        ),
        SessionOutcome::Interrupted { recorded, planned } => format!(
            "{} {}",
            "\u{26A0}".yellow().bold(),
            format!(
                "SESSION INTERRUPTED — {} of {} points recorded",
                recorded, planned
            )
            .yellow()
            .bold()
        ),
    };
    out.push_str(&header);
    out.push('\n');

    for (name, fit) in table.header.iter().skip(1).zip(&table.fits) {
        match (fit.slope, fit.intercept) {
            (Some(slope), Some(intercept)) => {
                out.push_str(&format!(
                    "  {}: slope {:.6}, intercept {:.6}\n",
                    name.bold(),
                    slope,
                    intercept
                ));
            }
            _ => {
                out.push_str(&format!(
                    "  {}: {}\n",
                    name.bold(),
                    "undefined (fewer than 2 points)".dimmed()
                ));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CalibrationPoint;

    #[test]
    fn summary_mentions_every_channel() {
        colored::control::set_override(false);

        let points = vec![
            CalibrationPoint {
                rtd_temp: 0.0,
                probe_temps: vec![1.0, 5.0],
            },
            CalibrationPoint {
                rtd_temp: 100.0,
                probe_temps: vec![201.0, 55.0],
            },
        ];
        let table =
            CalibrationTable::from_points(&points, &["A".to_string(), "B".to_string()]);
        let summary = format_summary(SessionOutcome::Completed { recorded: 2 }, &table);

        assert!(summary.contains("CALIBRATION COMPLETE"));
        assert!(summary.contains("A: slope 2.000000"));
        assert!(summary.contains("B: slope 0.500000"));
    }

    #[test]
    fn interrupted_summary_reports_partial_progress() {
        colored::control::set_override(false);

        let table = CalibrationTable::from_points(&[], &["A".to_string()]);
        let summary = format_summary(
            SessionOutcome::Interrupted {
                recorded: 1,
                planned: 5,
            },
            &table,
        );
        assert!(summary.contains("1 of 5"));
        assert!(summary.contains("undefined"));
    }
}
