//! Time window computation for the three reporting spans
//!
//! A [`Window`] is the pure description of one report query: aligned
//! `[start, end)` boundaries, the bucket granularity, and which boundary
//! buckets are excluded from scalar sums. Computing a window never touches
//! the network.
//!
//! The backend keys histogram buckets by the *start* of each interval, while
//! report consumers label buckets by their *end* instant. The single
//! right-alignment policy used everywhere is a post-hoc shift: after a
//! response is decoded, every bucket timestamp is advanced by exactly one
//! [`BucketInterval`]. No query-side offset is ever sent.

use crate::error::{GraccstatError, Result};
use crate::types::{HistogramDataPoint, Timespan};
use chrono::{DateTime, Datelike, Duration, DurationRound, Months, TimeZone, Utc};

/// Bucket granularity of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketInterval {
    /// One hour
    Hour,
    /// One UTC day
    Day,
    /// One calendar month
    CalendarMonth,
}

impl BucketInterval {
    /// The interval string sent in the `date_histogram` aggregation
    pub fn es_interval(&self) -> &'static str {
        match self {
            Self::Hour => "1h",
            Self::Day => "24h",
            Self::CalendarMonth => "month",
        }
    }

    /// Advance a timestamp by exactly one bucket.
    ///
    /// This is the right-alignment shift: applied to a backend bucket key
    /// (the interval start) it yields the interval end.
    pub fn advance(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Hour => ts + Duration::hours(1),
            Self::Day => ts + Duration::days(1),
            Self::CalendarMonth => ts
                .checked_add_months(Months::new(1))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

/// Which boundary buckets are excluded when summing a window.
///
/// Histograms always include every bucket in range; sums only include the
/// buckets guaranteed fully elapsed at the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Drop the first bucket (alignment remainder) and the last bucket
    /// (in-progress) before summing. Used for daily and monthly windows.
    TrimBothEnds,
    /// Drop only the last bucket. Used for the yearly window, whose
    /// calendar-month buckets have no leading alignment remainder but whose
    /// final month is still in progress.
    TrimTrailing,
}

impl BoundaryPolicy {
    /// The sub-slice of data points that counts as complete
    pub fn complete_slice<'a>(&self, points: &'a [HistogramDataPoint]) -> &'a [HistogramDataPoint] {
        match self {
            Self::TrimBothEnds => {
                if points.len() <= 2 {
                    &[]
                } else {
                    &points[1..points.len() - 1]
                }
            }
            Self::TrimTrailing => points.split_last().map(|(_, rest)| rest).unwrap_or(&[]),
        }
    }
}

/// An aligned `[start, end)` query window with its bucket granularity and
/// sum-trim policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// The timespan this window was computed for
    pub timespan: Timespan,
    /// Window start (inclusive)
    pub start: DateTime<Utc>,
    /// Window end (exclusive)
    pub end: DateTime<Utc>,
    /// Bucket granularity
    pub interval: BucketInterval,
    /// Which boundary buckets the sum excludes
    pub boundary_policy: BoundaryPolicy,
}

impl Window {
    /// Compute the aligned window for a timespan at a reference instant.
    ///
    /// - `daily`: 24 hourly buckets ending at the reference rounded up to the
    ///   next hour, so the in-progress hour is the most recent bucket.
    /// - `monthly`: 30 UTC-day buckets ending at the reference rounded up to
    ///   the next UTC midnight. The backend buckets in UTC; local-time
    ///   rounding here would shift every bucket by up to a day.
    /// - `yearly`: calendar-month buckets from the first of the month one
    ///   year before the reference, up to the reference itself.
    ///
    /// # Examples
    /// ```
    /// use graccstat::types::Timespan;
    /// use graccstat::window::Window;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let reference = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
    /// let window = Window::compute(Timespan::Daily, reference).unwrap();
    /// assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 14, 10, 0, 0).unwrap());
    /// assert_eq!(window.end, reference);
    /// ```
    pub fn compute(timespan: Timespan, reference: DateTime<Utc>) -> Result<Window> {
        let window = match timespan {
            Timespan::Daily => {
                let end = ceil_to(reference, Duration::hours(1))?;
                Window {
                    timespan,
                    start: end - Duration::hours(24),
                    end,
                    interval: BucketInterval::Hour,
                    boundary_policy: BoundaryPolicy::TrimBothEnds,
                }
            }
            Timespan::Monthly => {
                let end = ceil_to(reference, Duration::days(1))?;
                Window {
                    timespan,
                    start: end - Duration::days(30),
                    end,
                    interval: BucketInterval::Day,
                    boundary_policy: BoundaryPolicy::TrimBothEnds,
                }
            }
            Timespan::Yearly => Window {
                timespan,
                start: first_of_month_one_year_before(reference)?,
                end: reference,
                interval: BucketInterval::CalendarMonth,
                boundary_policy: BoundaryPolicy::TrimTrailing,
            },
        };

        if window.start >= window.end {
            return Err(GraccstatError::Alignment(format!(
                "{timespan} window start {} is not before end {}",
                window.start, window.end
            )));
        }

        Ok(window)
    }
}

/// Round a timestamp up to the next multiple of `step` since the epoch.
/// Already-aligned timestamps are returned unchanged.
fn ceil_to(ts: DateTime<Utc>, step: Duration) -> Result<DateTime<Utc>> {
    let floor = ts
        .duration_trunc(step)
        .map_err(|e| GraccstatError::Alignment(format!("cannot truncate {ts} to {step}: {e}")))?;
    if floor == ts {
        Ok(floor)
    } else {
        Ok(floor + step)
    }
}

/// Midnight UTC on the first day of the month containing `reference - 1 year`
fn first_of_month_one_year_before(reference: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let a_year_ago = reference
        .checked_sub_months(Months::new(12))
        .ok_or_else(|| {
            GraccstatError::Alignment(format!("cannot subtract a year from {reference}"))
        })?;
    Utc.with_ymd_and_hms(a_year_ago.year(), a_year_ago.month(), 1, 0, 0, 0)
        .single()
        .ok_or_else(|| {
            GraccstatError::Alignment(format!(
                "no first-of-month instant for {}-{:02}",
                a_year_ago.year(),
                a_year_ago.month()
            ))
        })
}
