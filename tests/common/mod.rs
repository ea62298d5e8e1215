//! Common test utilities and helpers for graccstat tests
//!
//! Provides a builder for `GeneratedReports` fixtures and a scripted
//! `ReportSource` whose successive `generate` calls replay a fixed sequence
//! of outcomes.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use graccstat::error::{GraccstatError, Result};
use graccstat::report_generator::ReportSource;
use graccstat::types::{AnalysisResult, GeneratedReports, HistogramDataPoint, SumResult};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed reference instant used across fixtures
pub fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
}

/// Builder for `GeneratedReports` fixtures
pub struct ReportsBuilder {
    generated_at: DateTime<Utc>,
    jobs_per_bucket: u64,
    cpu_hours_per_bucket: f64,
}

impl ReportsBuilder {
    pub fn new() -> Self {
        Self {
            generated_at: reference(),
            jobs_per_bucket: 10,
            cpu_hours_per_bucket: 25.0,
        }
    }

    #[allow(dead_code)]
    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }

    pub fn jobs_per_bucket(mut self, jobs: u64) -> Self {
        self.jobs_per_bucket = jobs;
        self
    }

    fn analysis(&self, buckets: usize, spacing: Duration) -> AnalysisResult {
        let window_end = self.generated_at;
        let window_start = window_end - spacing * buckets as i32;
        let data_points = (1..=buckets)
            .map(|i| HistogramDataPoint {
                timestamp: window_start + spacing * i as i32,
                job_count: self.jobs_per_bucket,
                cpu_hours: self.cpu_hours_per_bucket,
            })
            .collect();
        AnalysisResult {
            query_duration_ms: 12,
            window_start,
            window_end,
            data_points,
        }
    }

    fn sum(&self, complete_buckets: usize) -> SumResult {
        SumResult {
            sum_jobs: self.jobs_per_bucket * complete_buckets as u64,
            sum_cpu_hours: self.cpu_hours_per_bucket * complete_buckets as f64,
        }
    }

    pub fn build(self) -> GeneratedReports {
        GeneratedReports {
            generated_at: self.generated_at,
            daily: self.analysis(24, Duration::hours(1)),
            daily_sum: self.sum(22),
            monthly: self.analysis(30, Duration::days(1)),
            monthly_sum: self.sum(28),
            yearly: self.analysis(13, Duration::days(30)),
            yearly_sum: self.sum(12),
        }
    }
}

/// One scripted outcome of a `generate` call
pub enum Outcome {
    Reports(GeneratedReports),
    Error(&'static str),
}

/// Source that replays a fixed sequence of outcomes, then repeats the last one
pub struct ScriptedSource {
    outcomes: Mutex<Vec<Outcome>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(mut outcomes: Vec<Outcome>) -> Self {
        // stored in reverse so generate can pop from the back
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportSource for ScriptedSource {
    async fn generate(&self) -> Result<GeneratedReports> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut outcomes = self.outcomes.lock().expect("outcomes lock poisoned");
        let outcome = if outcomes.len() > 1 {
            outcomes.pop().expect("scripted source has outcomes")
        } else {
            match outcomes.last().expect("scripted source has outcomes") {
                Outcome::Reports(reports) => Outcome::Reports(reports.clone()),
                Outcome::Error(message) => Outcome::Error(*message),
            }
        };
        match outcome {
            Outcome::Reports(reports) => Ok(reports),
            Outcome::Error(message) => Err(GraccstatError::MalformedResponse(message.into())),
        }
    }
}
