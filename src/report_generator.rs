//! Report assembly: windows, queries, and boundary-trimmed sums
//!
//! The [`ReportGenerator`] drives the window calculator and the query client
//! for all three timespans and assembles the [`GeneratedReports`] value. The
//! three window queries have no ordering dependency and are issued
//! concurrently; assembly is atomic from the caller's point of view.
//!
//! Sums follow the trim-then-sum policy: the histogram keeps every bucket in
//! range, the sum only counts buckets fully elapsed at the reference instant.

use crate::config::GraccConfig;
use crate::error::Result;
use crate::gracc_client::GraccClient;
use crate::types::{AnalysisResult, GeneratedReports, SumResult, Timespan};
use crate::window::Window;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future;
use tracing::info;

/// Anything that can produce a fresh [`GeneratedReports`] value.
///
/// The cache and the revalidator depend on this seam rather than on the
/// concrete generator, so they can be exercised against fake sources.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Generate reports at the current instant
    async fn generate(&self) -> Result<GeneratedReports>;
}

/// Assembles `GeneratedReports` from the GRACC backend
pub struct ReportGenerator {
    client: GraccClient,
    config: GraccConfig,
}

impl ReportGenerator {
    /// Create a generator for a backend configuration
    pub fn new(config: GraccConfig) -> Result<Self> {
        config.validate()?;
        let client = GraccClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// Assemble the three reports for a reference instant.
    ///
    /// The reference is computed once and shared by every window; it becomes
    /// the `generated_at` field of the result. Any query failure aborts the
    /// whole assembly; no partial reports are returned.
    pub async fn assemble(&self, reference: DateTime<Utc>) -> Result<GeneratedReports> {
        let (daily, monthly, yearly) = future::try_join3(
            self.analyze(Timespan::Daily, reference),
            self.analyze(Timespan::Monthly, reference),
            self.analyze(Timespan::Yearly, reference),
        )
        .await?;

        info!(
            %reference,
            daily_ms = daily.0.query_duration_ms,
            monthly_ms = monthly.0.query_duration_ms,
            yearly_ms = yearly.0.query_duration_ms,
            "assembled reports"
        );

        Ok(GeneratedReports {
            generated_at: reference,
            daily: daily.0,
            daily_sum: daily.1,
            monthly: monthly.0,
            monthly_sum: monthly.1,
            yearly: yearly.0,
            yearly_sum: yearly.1,
        })
    }

    /// Query one timespan and sum its complete buckets
    async fn analyze(
        &self,
        timespan: Timespan,
        reference: DateTime<Utc>,
    ) -> Result<(AnalysisResult, SumResult)> {
        let window = Window::compute(timespan, reference)?;
        let index = self.config.index_for(timespan);
        let analysis = self.client.query(&window, index).await?;
        let sum = sum_complete_buckets(&window, &analysis);
        Ok((analysis, sum))
    }
}

/// Sum only the buckets the window's boundary policy considers complete
fn sum_complete_buckets(window: &Window, analysis: &AnalysisResult) -> SumResult {
    SumResult::over(window.boundary_policy.complete_slice(&analysis.data_points))
}

#[async_trait]
impl ReportSource for ReportGenerator {
    async fn generate(&self) -> Result<GeneratedReports> {
        self.assemble(Utc::now()).await
    }
}
