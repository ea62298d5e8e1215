//! Core domain types for graccstat
//!
//! This module contains the fundamental types used throughout the graccstat
//! library: the three reporting timespans, histogram data points, per-window
//! analysis results, scalar sums, and the assembled `GeneratedReports` value
//! that is handed to consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three reporting spans, each with its own granularity.
///
/// # Examples
/// ```
/// use graccstat::types::Timespan;
///
/// let span: Timespan = "monthly".parse().unwrap();
/// assert_eq!(span, Timespan::Monthly);
/// assert_eq!(span.to_string(), "monthly");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timespan {
    /// Last 24 hours, hourly buckets
    Daily,
    /// Last 30 days, daily buckets
    Monthly,
    /// Last 12 months, calendar-month buckets
    Yearly,
}

impl Timespan {
    /// All timespans, in report order
    pub const ALL: [Timespan; 3] = [Timespan::Daily, Timespan::Monthly, Timespan::Yearly];
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

impl std::str::FromStr for Timespan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Invalid timespan: {s}")),
        }
    }
}

/// One bucket of the histogram: a time slice with its summed job count and
/// consumed compute-hours.
///
/// The timestamp labels the *end* of the bucket's interval; sequences of data
/// points are ordered by timestamp ascending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramDataPoint {
    /// End instant of the bucket's interval
    pub timestamp: DateTime<Utc>,
    /// Number of jobs that finished in the bucket
    pub job_count: u64,
    /// Compute-hours consumed in the bucket
    pub cpu_hours: f64,
}

/// One window's full histogram as returned by the backend, including
/// boundary buckets that may be partial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// How long the backend spent answering the query, in milliseconds
    pub query_duration_ms: u64,
    /// Window start (inclusive)
    pub window_start: DateTime<Utc>,
    /// Window end (exclusive)
    pub window_end: DateTime<Utc>,
    /// Bucketed sums, ordered by timestamp ascending
    pub data_points: Vec<HistogramDataPoint>,
}

/// Aggregate over only the complete buckets of a window.
///
/// Partial boundary buckets are excluded before summing; see
/// [`BoundaryPolicy`](crate::window::BoundaryPolicy) for which buckets count
/// as complete per timespan.
///
/// # Examples
/// ```
/// use graccstat::types::{HistogramDataPoint, SumResult};
/// use chrono::Utc;
///
/// let points = vec![
///     HistogramDataPoint { timestamp: Utc::now(), job_count: 10, cpu_hours: 2.5 },
///     HistogramDataPoint { timestamp: Utc::now(), job_count: 5, cpu_hours: 1.0 },
/// ];
/// let sum = SumResult::over(&points);
/// assert_eq!(sum.sum_jobs, 15);
/// assert_eq!(sum.sum_cpu_hours, 3.5);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SumResult {
    /// Total jobs over the complete buckets
    pub sum_jobs: u64,
    /// Total compute-hours over the complete buckets
    pub sum_cpu_hours: f64,
}

impl SumResult {
    /// Fold a slice of data points into a sum
    pub fn over(points: &[HistogramDataPoint]) -> Self {
        points.iter().fold(Self::default(), |mut acc, point| {
            acc.sum_jobs += point.job_count;
            acc.sum_cpu_hours += point.cpu_hours;
            acc
        })
    }

    /// True when both fields are exactly zero
    pub fn is_zero(&self) -> bool {
        self.sum_jobs == 0 && self.sum_cpu_hours == 0.0
    }
}

/// The daily, monthly, and yearly reports for compute-hours and job count.
///
/// Immutable value object: once assembled it is never mutated, only replaced
/// wholesale. Consumers receive it as `Arc<GeneratedReports>` and read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedReports {
    /// The reference instant all three windows were computed from
    pub generated_at: DateTime<Utc>,
    /// Last 24 hours, hourly buckets
    pub daily: AnalysisResult,
    /// Sum over the complete hourly buckets
    pub daily_sum: SumResult,
    /// Last 30 days, daily buckets
    pub monthly: AnalysisResult,
    /// Sum over the complete daily buckets
    pub monthly_sum: SumResult,
    /// Last 12 months, calendar-month buckets
    pub yearly: AnalysisResult,
    /// Sum over the complete monthly buckets
    pub yearly_sum: SumResult,
}

impl GeneratedReports {
    /// The histogram for a given timespan
    pub fn analysis(&self, timespan: Timespan) -> &AnalysisResult {
        match timespan {
            Timespan::Daily => &self.daily,
            Timespan::Monthly => &self.monthly,
            Timespan::Yearly => &self.yearly,
        }
    }

    /// The scalar sum for a given timespan
    pub fn sum(&self, timespan: Timespan) -> &SumResult {
        match timespan {
            Timespan::Daily => &self.daily_sum,
            Timespan::Monthly => &self.monthly_sum,
            Timespan::Yearly => &self.yearly_sum,
        }
    }

    /// Sanity check on assembled reports.
    ///
    /// A report whose sums are all exactly zero means the backend was
    /// unreachable or misconfigured, not that the grid ran zero jobs. Such a
    /// report must never be cached or served.
    pub fn passes_sanity_check(&self) -> bool {
        Timespan::ALL.iter().any(|&span| !self.sum(span).is_zero())
    }
}
