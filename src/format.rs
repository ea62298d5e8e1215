//! Display helpers for report values
//!
//! Job totals on the OSG scale are displayed rounded to the nearest thousand;
//! bucket labels carry just enough of the timestamp for their timespan's
//! granularity.

use crate::types::Timespan;
use chrono::{DateTime, Utc};

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (count, ch) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }

    result.chars().rev().collect()
}

/// Format a job total "clean": rounded to the nearest thousand, with
/// thousands separators
pub fn format_job_total(n: u64) -> String {
    let rounded = (n + 500) / 1000 * 1000;
    format_number(rounded)
}

/// Format compute-hours rounded to whole hours, with thousands separators
pub fn format_cpu_hours(hours: f64) -> String {
    format_number(hours.round().max(0.0) as u64)
}

/// Format a bucket label appropriate to the timespan's granularity
pub fn format_bucket_label(ts: &DateTime<Utc>, timespan: Timespan) -> String {
    match timespan {
        Timespan::Daily => ts.format("%m/%d %H:%M").to_string(),
        Timespan::Monthly => ts.format("%m/%d/%Y").to_string(),
        Timespan::Yearly => ts.format("%B %Y").to_string(),
    }
}
