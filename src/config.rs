//! Configuration for the GRACC backend connection
//!
//! All externally supplied knobs live here: the backend base URL, the two
//! index names, the revalidation interval, and the per-query timeout. The
//! defaults match the production GRACC deployment; every field can be
//! overridden from the CLI or environment (see [`crate::cli`]).

use crate::error::{GraccstatError, Result};
use crate::types::Timespan;
use std::time::Duration;

/// Production GRACC Elasticsearch endpoint
pub const DEFAULT_ENDPOINT: &str = "https://gracc.opensciencegrid.org/q";

/// The raw index contains more detailed time data
pub const DEFAULT_RAW_INDEX: &str = "gracc.osg.raw";

/// The summary index contains pre-aggregated data and is faster to query
pub const DEFAULT_SUMMARY_INDEX: &str = "gracc.osg.summary";

/// How often long-lived consumers revalidate their reports
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3 * 60);

/// Per-query HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection and scheduling configuration for report generation
///
/// # Examples
/// ```
/// use graccstat::config::GraccConfig;
/// use graccstat::types::Timespan;
///
/// let config = GraccConfig::default();
/// assert_eq!(config.index_for(Timespan::Daily), "gracc.osg.raw");
/// assert_eq!(config.index_for(Timespan::Yearly), "gracc.osg.summary");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraccConfig {
    /// Backend base URL, without a trailing slash
    pub endpoint: String,
    /// High-resolution index, used for the daily window
    pub raw_index: String,
    /// Pre-aggregated index, used for the monthly and yearly windows
    pub summary_index: String,
    /// Interval between revalidation attempts
    pub refresh_interval: Duration,
    /// Timeout applied to each backend query
    pub request_timeout: Duration,
}

impl Default for GraccConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            raw_index: DEFAULT_RAW_INDEX.to_string(),
            summary_index: DEFAULT_SUMMARY_INDEX.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl GraccConfig {
    /// Override the backend endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the high-resolution index name
    pub fn with_raw_index(mut self, index: impl Into<String>) -> Self {
        self.raw_index = index.into();
        self
    }

    /// Override the pre-aggregated index name
    pub fn with_summary_index(mut self, index: impl Into<String>) -> Self {
        self.summary_index = index.into();
        self
    }

    /// Override the revalidation interval
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Override the per-query timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Which index serves a given timespan.
    ///
    /// The daily window needs hour resolution and reads the raw index; the
    /// larger windows read the pre-aggregated summary index.
    pub fn index_for(&self, timespan: Timespan) -> &str {
        match timespan {
            Timespan::Daily => &self.raw_index,
            Timespan::Monthly | Timespan::Yearly => &self.summary_index,
        }
    }

    /// Reject configurations that cannot possibly work
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(GraccstatError::Config("endpoint must not be empty".into()));
        }
        if self.raw_index.is_empty() || self.summary_index.is_empty() {
            return Err(GraccstatError::Config(
                "index names must not be empty".into(),
            ));
        }
        if self.refresh_interval.is_zero() {
            return Err(GraccstatError::Config(
                "refresh interval must be positive".into(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(GraccstatError::Config(
                "request timeout must be positive".into(),
            ));
        }
        Ok(())
    }
}
