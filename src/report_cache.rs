//! Process-lifetime memoization of the generated reports
//!
//! The [`ReportCache`] computes one [`GeneratedReports`] per process and
//! hands the same `Arc` to every caller afterwards. The build slot is a
//! single-flight guard: the first caller performs the build while concurrent
//! callers wait on the lock and share its result, so the backend is never
//! queried twice for the same process lifetime.
//!
//! The cache is an injectable service. It is constructed once at process
//! start and passed by reference to whoever needs the snapshot; there is no
//! ambient global report.

use crate::error::{GraccstatError, Result};
use crate::report_generator::ReportSource;
use crate::types::GeneratedReports;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Single-flight, build-once cache for [`GeneratedReports`]
pub struct ReportCache {
    source: Arc<dyn ReportSource>,
    slot: RwLock<Option<Arc<GeneratedReports>>>,
}

impl ReportCache {
    /// Create a cache over a report source
    pub fn new(source: Arc<dyn ReportSource>) -> Self {
        Self {
            source,
            slot: RwLock::new(None),
        }
    }

    /// Return the cached reports, building them on the first call.
    ///
    /// Concurrent first calls block on the build slot's write lock; exactly
    /// one of them generates, the rest receive the stored value. A build
    /// whose sums are all zero is a fatal initialization failure: it returns
    /// [`GraccstatError::SanityCheck`] and nothing is cached, because serving
    /// all-zero data would silently misrepresent an unreachable backend.
    pub async fn get_or_build(&self) -> Result<Arc<GeneratedReports>> {
        {
            let slot = self.slot.read().await;
            if let Some(reports) = slot.as_ref() {
                return Ok(reports.clone());
            }
        }

        let mut slot = self.slot.write().await;
        // another caller may have built while we waited for the write lock
        if let Some(reports) = slot.as_ref() {
            return Ok(reports.clone());
        }

        let reports = self.source.generate().await?;
        if !reports.passes_sanity_check() {
            return Err(GraccstatError::SanityCheck);
        }

        info!(generated_at = %reports.generated_at, "cached generated reports");
        let reports = Arc::new(reports);
        *slot = Some(reports.clone());
        Ok(reports)
    }

    /// The cached reports, if a build has completed
    pub async fn peek(&self) -> Option<Arc<GeneratedReports>> {
        self.slot.read().await.clone()
    }
}
