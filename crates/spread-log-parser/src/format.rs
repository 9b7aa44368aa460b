//! Human-readable rendering of analysis reports

use crate::types::{AnalysisReport, Phase, TestExecution};

const TITLE: &str = "Test Execution Time Analysis";
const NO_DATA: &str = "No test execution data found in the log.";
const HEADERS: [&str; 7] = [
    "Test", "System", "Prepare", "Execute", "Restore", "Debug", "Total",
];
/// Columns holding names rather than durations, left-aligned
const TEXT_COLUMNS: usize = 2;
const COLUMN_GAP: &str = "  ";

/// Format a duration in seconds as `1h 2m 3.4s`, dropping leading zero units
///
/// ```
/// use spread_log_parser::format_duration;
///
/// assert_eq!(format_duration(0.5), "0.5s");
/// assert_eq!(format_duration(90.5), "1m 30.5s");
/// assert_eq!(format_duration(3661.5), "1h 1m 1.5s");
/// ```
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);

    if seconds < 60.0 {
        return format!("{seconds:.1}s");
    }

    if seconds < 3600.0 {
        let minutes = (seconds / 60.0).floor();
        return format!("{}m {:.1}s", minutes as u64, seconds - minutes * 60.0);
    }

    let hours = (seconds / 3600.0).floor();
    let remainder = seconds - hours * 3600.0;
    let minutes = (remainder / 60.0).floor();
    format!(
        "{}h {}m {:.1}s",
        hours as u64,
        minutes as u64,
        remainder - minutes * 60.0
    )
}

/// Render a report as a table, one row per test in report order
pub fn format_summary(report: &AnalysisReport) -> String {
    if report.is_empty() {
        return format!("{NO_DATA}\n");
    }

    let mut rows: Vec<[String; 7]> = report.tests.iter().map(test_row).collect();
    rows.push(totals_row(report));

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = HEADERS.map(str::to_string);
    let rule = widths.map(|width| "-".repeat(width));
    let totals_at = rows.len() - 1;

    let mut out = String::new();
    out.push_str(TITLE);
    out.push('\n');
    out.push_str(&"=".repeat(TITLE.len()));
    out.push_str("\n\n");
    out.push_str(&render_row(&header, &widths));
    out.push_str(&render_row(&rule, &widths));
    for (i, row) in rows.iter().enumerate() {
        if i == totals_at {
            out.push_str(&render_row(&rule, &widths));
        }
        out.push_str(&render_row(row, &widths));
    }
    out
}

fn test_row(test: &TestExecution) -> [String; 7] {
    [
        test.test_name.clone(),
        test.system.clone(),
        phase_cell(test, Phase::Preparing),
        phase_cell(test, Phase::Executing),
        phase_cell(test, Phase::Restoring),
        phase_cell(test, Phase::Debugging),
        format_duration(test.total_duration()),
    ]
}

/// A phase the test never entered shows as `-` rather than `0.0s`
fn phase_cell(test: &TestExecution, phase: Phase) -> String {
    if test.phases.contains_key(&phase) {
        format_duration(test.phase_duration(phase))
    } else {
        "-".to_string()
    }
}

fn totals_row(report: &AnalysisReport) -> [String; 7] {
    let phase_total = |phase: Phase| -> String {
        let total: f64 = report.tests.iter().map(|t| t.phase_duration(phase)).sum();
        format_duration(total)
    };
    let label = match report.len() {
        1 => "Total (1 test)".to_string(),
        n => format!("Total ({n} tests)"),
    };

    [
        label,
        String::new(),
        phase_total(Phase::Preparing),
        phase_total(Phase::Executing),
        phase_total(Phase::Restoring),
        phase_total(Phase::Debugging),
        format_duration(report.total_duration()),
    ]
}

fn render_row(cells: &[String; 7], widths: &[usize; 7]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            if i < TEXT_COLUMNS {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    format!("{}\n", line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhaseSpan;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 13)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_duration(0.0), "0.0s");
        assert_eq!(format_duration(0.5), "0.5s");
        assert_eq!(format_duration(30.0), "30.0s");
        assert_eq!(format_duration(59.9), "59.9s");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_duration(60.0), "1m 0.0s");
        assert_eq!(format_duration(90.5), "1m 30.5s");
        assert_eq!(format_duration(3599.0), "59m 59.0s");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_duration(3600.0), "1h 0m 0.0s");
        assert_eq!(format_duration(3661.5), "1h 1m 1.5s");
        assert_eq!(format_duration(7384.2), "2h 3m 4.2s");
    }

    #[test]
    fn test_summary_with_tests() {
        let mut test = TestExecution::new(
            "tests/desktop/firefox".to_string(),
            "archlinux-cloud".to_string(),
        );
        test.phases.insert(
            Phase::Preparing,
            PhaseSpan {
                start: at(11, 15, 15),
                end: Some(at(11, 16, 13)),
            },
        );
        let report = AnalysisReport { tests: vec![test] };

        let summary = format_summary(&report);
        assert!(summary.starts_with(TITLE));
        assert!(summary.contains("tests/desktop/firefox"));
        assert!(summary.contains("archlinux-cloud"));
        assert!(summary.contains("58.0s"));
        assert!(summary.contains("Total (1 test)"));
        assert!(!summary.contains(NO_DATA));
    }

    #[test]
    fn test_summary_columns_align() {
        let short = TestExecution::new("a".to_string(), "h".to_string());
        let long = TestExecution::new("tests/a/much/longer/name".to_string(), "h".to_string());
        let report = AnalysisReport {
            tests: vec![short, long],
        };

        let summary = format_summary(&report);
        // Header, rule, two tests, rule, totals
        let table: Vec<&str> = summary.lines().skip(3).collect();
        assert_eq!(table.len(), 6);
        // The last column is right-aligned, so every row ends at the same place
        let width = table[0].len();
        assert!(table.iter().all(|line| line.len() == width), "{summary}");
        assert!(table[2].starts_with("a "));
        assert!(table[5].starts_with("Total (2 tests)"));
    }

    #[test]
    fn test_summary_empty() {
        let summary = format_summary(&AnalysisReport::new());
        assert!(summary.contains("No test execution data found"));
        assert!(!summary.contains(TITLE));
    }
}
