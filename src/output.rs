//! Output formatting for generated reports
//!
//! This module provides formatters for displaying report data in different
//! formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! The formatters are pure consumers of [`GeneratedReports`]; nothing here
//! feeds back into report generation.

use crate::format::{format_bucket_label, format_cpu_hours, format_job_total, format_number};
use crate::types::{GeneratedReports, Timespan};
use prettytable::{Table, format, row};
use serde_json::json;

/// Trait for report formatters
pub trait OutputFormatter {
    /// Format the three-window summary
    fn format_summary(&self, reports: &GeneratedReports) -> String;

    /// Format one window's full histogram
    fn format_histogram(&self, reports: &GeneratedReports, timespan: Timespan) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl TableFormatter {
    fn timespan_title(timespan: Timespan) -> &'static str {
        match timespan {
            Timespan::Daily => "Last 24 hours",
            Timespan::Monthly => "Last 30 days",
            Timespan::Yearly => "Last 12 months",
        }
    }
}

impl OutputFormatter for TableFormatter {
    fn format_summary(&self, reports: &GeneratedReports) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Window",
            b -> "Buckets",
            b -> "Jobs",
            b -> "CPU Hours",
            b -> "Query ms"
        ]);

        for timespan in Timespan::ALL {
            let analysis = reports.analysis(timespan);
            let sum = reports.sum(timespan);
            table.add_row(row![
                Self::timespan_title(timespan),
                r -> analysis.data_points.len(),
                r -> format_job_total(sum.sum_jobs),
                r -> format_cpu_hours(sum.sum_cpu_hours),
                r -> analysis.query_duration_ms
            ]);
        }

        format!(
            "Generated at {}\n{}",
            reports.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            table
        )
    }

    fn format_histogram(&self, reports: &GeneratedReports, timespan: Timespan) -> String {
        let analysis = reports.analysis(timespan);

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Bucket",
            b -> "Jobs",
            b -> "CPU Hours"
        ]);

        for point in &analysis.data_points {
            table.add_row(row![
                format_bucket_label(&point.timestamp, timespan),
                r -> format_number(point.job_count),
                r -> format_cpu_hours(point.cpu_hours)
            ]);
        }

        format!(
            "{} ({} - {})\n{}",
            Self::timespan_title(timespan),
            analysis.window_start.format("%Y-%m-%d %H:%M UTC"),
            analysis.window_end.format("%Y-%m-%d %H:%M UTC"),
            table
        )
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_summary(&self, reports: &GeneratedReports) -> String {
        serde_json::to_string_pretty(reports).unwrap()
    }

    fn format_histogram(&self, reports: &GeneratedReports, timespan: Timespan) -> String {
        let output = json!({
            "timespan": timespan.to_string(),
            "analysis": reports.analysis(timespan),
            "sum": reports.sum(timespan),
        });
        serde_json::to_string_pretty(&output).unwrap()
    }
}

/// Get the appropriate formatter based on output type
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}
