use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use graccstat::types::{HistogramDataPoint, SumResult, Timespan};
use graccstat::window::Window;
use std::hint::black_box;

fn create_test_points(count: usize) -> Vec<HistogramDataPoint> {
    let base = Utc.with_ymd_and_hms(2024, 3, 14, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| HistogramDataPoint {
            timestamp: base + Duration::hours(i as i64),
            job_count: (i * 37) as u64,
            cpu_hours: (i as f64) * 12.5,
        })
        .collect()
}

fn benchmark_window_computation(c: &mut Criterion) {
    let reference = Utc.with_ymd_and_hms(2024, 3, 15, 10, 27, 31).unwrap();

    let mut group = c.benchmark_group("window_computation");
    for timespan in Timespan::ALL {
        group.bench_function(timespan.to_string(), |b| {
            b.iter(|| Window::compute(black_box(timespan), black_box(reference)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_trimmed_sum(c: &mut Criterion) {
    let reference = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
    let window = Window::compute(Timespan::Daily, reference).unwrap();
    let points = create_test_points(24);

    c.bench_function("trimmed_sum_daily", |b| {
        b.iter(|| {
            let complete = window.boundary_policy.complete_slice(black_box(&points));
            black_box(SumResult::over(complete))
        })
    });
}

criterion_group!(benches, benchmark_window_computation, benchmark_trimmed_sum);
criterion_main!(benches);
