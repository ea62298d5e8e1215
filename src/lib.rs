//! graccstat - Generate and cache OSG usage reports from the GRACC accounting backend
//!
//! This library provides functionality to:
//! - Compute correctly aligned daily/monthly/yearly reporting windows
//! - Issue bucketed sum-aggregation queries against a GRACC Elasticsearch endpoint
//! - Assemble histograms and boundary-trimmed sums into `GeneratedReports`
//! - Memoize one report per process with a single-flight, sanity-gated cache
//! - Revalidate reports on a fixed interval with last-known-good fallback
//!
//! # Examples
//!
//! ```no_run
//! use graccstat::{
//!     config::GraccConfig,
//!     report_cache::ReportCache,
//!     report_generator::ReportGenerator,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> graccstat::Result<()> {
//!     let config = GraccConfig::default();
//!     let generator = Arc::new(ReportGenerator::new(config)?);
//!     let cache = ReportCache::new(generator);
//!
//!     // First call queries the backend; later calls share the same value
//!     let reports = cache.get_or_build().await?;
//!     println!("{} daily buckets", reports.daily.data_points.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod gracc_client;
pub mod output;
pub mod report_cache;
pub mod report_generator;
pub mod revalidator;
pub mod types;
pub mod window;

// Re-export commonly used types
pub use error::{GraccstatError, Result};
pub use types::{AnalysisResult, GeneratedReports, HistogramDataPoint, SumResult, Timespan};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
