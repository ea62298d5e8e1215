//! Integration tests for graccstat
//!
//! These tests exercise the report pipeline across module boundaries: window
//! computation against the worked reference example, the single-flight cache
//! over a scripted source, and the revalidator's fallback behavior.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{Outcome, ReportsBuilder, ScriptedSource, reference};
use graccstat::error::GraccstatError;
use graccstat::report_cache::ReportCache;
use graccstat::revalidator::Revalidator;
use graccstat::types::{SumResult, Timespan};
use graccstat::window::{BoundaryPolicy, BucketInterval, Window};
use std::sync::Arc;

#[test]
fn test_worked_example_windows() {
    // reference = 2024-03-15T10:00:00Z
    let reference = reference();

    let daily = Window::compute(Timespan::Daily, reference).unwrap();
    assert_eq!(
        daily.start,
        Utc.with_ymd_and_hms(2024, 3, 14, 10, 0, 0).unwrap()
    );
    assert_eq!(daily.end, reference);
    assert_eq!(daily.interval, BucketInterval::Hour);

    let monthly = Window::compute(Timespan::Monthly, reference).unwrap();
    assert_eq!(monthly.end - monthly.start, Duration::days(30));
    assert_eq!(monthly.end, Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap());

    let yearly = Window::compute(Timespan::Yearly, reference).unwrap();
    assert_eq!(
        yearly.start,
        Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(yearly.end, reference);
    assert_eq!(yearly.boundary_policy, BoundaryPolicy::TrimTrailing);
}

#[test]
fn test_trimmed_sums_match_reports_fixture() {
    let reports = ReportsBuilder::new().jobs_per_bucket(10).build();

    let daily_complete =
        BoundaryPolicy::TrimBothEnds.complete_slice(&reports.daily.data_points);
    assert_eq!(daily_complete.len(), 22);
    assert_eq!(SumResult::over(daily_complete), reports.daily_sum);

    let yearly_complete =
        BoundaryPolicy::TrimTrailing.complete_slice(&reports.yearly.data_points);
    assert_eq!(yearly_complete.len(), 12);
    assert_eq!(SumResult::over(yearly_complete), reports.yearly_sum);
}

#[tokio::test(start_paused = true)]
async fn test_cache_single_flight_over_scripted_source() {
    let source = Arc::new(ScriptedSource::new(vec![Outcome::Reports(
        ReportsBuilder::new().build(),
    )]));
    let cache = Arc::new(ReportCache::new(source.clone()));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move { cache.get_or_build().await }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(source.calls(), 1);
    for result in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], result));
    }
}

#[tokio::test]
async fn test_cache_rejects_all_zero_build() {
    let source = Arc::new(ScriptedSource::new(vec![Outcome::Reports(
        ReportsBuilder::new().jobs_per_bucket(0).build(),
    )]));
    let cache = ReportCache::new(source);

    // every sum is zero when no bucket has activity, so the build must fail
    let err = cache.get_or_build().await.unwrap_err();
    assert!(matches!(err, GraccstatError::SanityCheck));
    assert!(cache.peek().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_revalidator_lifecycle_with_mixed_outcomes() {
    let refresh = std::time::Duration::from_secs(180);
    let good = ReportsBuilder::new().jobs_per_bucket(42).build();

    // first refresh fails, second succeeds
    let source = Arc::new(ScriptedSource::new(vec![
        Outcome::Error("backend unavailable"),
        Outcome::Reports(good.clone()),
    ]));

    let fallback = Arc::new(ReportsBuilder::new().jobs_per_bucket(1).build());
    let mut revalidator = Revalidator::new(source.clone(), fallback.clone(), refresh);
    revalidator.start();

    // after the first (failing) tick the fallback is still served
    tokio::time::sleep(refresh + std::time::Duration::from_secs(1)).await;
    assert_eq!(source.calls(), 1);
    assert!(Arc::ptr_eq(&revalidator.current().await, &fallback));

    // the second tick succeeds and replaces the value
    tokio::time::sleep(refresh).await;
    assert!(source.calls() >= 2);
    assert_eq!(revalidator.current().await.daily_sum.sum_jobs, good.daily_sum.sum_jobs);

    revalidator.stop().await;
    assert!(!revalidator.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_cache_snapshot_seeds_revalidator() {
    let refresh = std::time::Duration::from_secs(180);
    let source = Arc::new(ScriptedSource::new(vec![Outcome::Reports(
        ReportsBuilder::new().build(),
    )]));

    let cache = ReportCache::new(source.clone());
    let snapshot = cache.get_or_build().await.unwrap();

    let mut revalidator = Revalidator::new(source.clone(), snapshot.clone(), refresh);
    // until the first tick, consumers see exactly the cache's snapshot
    assert!(Arc::ptr_eq(&revalidator.current().await, &snapshot));

    revalidator.start();
    revalidator.stop().await;
    assert_eq!(source.calls(), 1);
}
