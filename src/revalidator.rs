//! Periodic revalidation for long-lived consumers
//!
//! A [`Revalidator`] keeps a current [`GeneratedReports`] value fresh by
//! re-running the report source on a fixed interval. It is seeded from a
//! caller-supplied fallback (normally the cache's build-time snapshot) and
//! replaces the value only on a successful, sanity-checked refresh. A failed
//! refresh is logged and the last known-good value keeps being served;
//! consumers never observe an error from this path.
//!
//! Only the timer drives refreshes. There are no focus, visibility, or
//! reconnect triggers, which bounds backend load to a predictable rate no
//! matter how many consumers read the value or how they behave. Each
//! revalidator owns its own task and state; nothing is shared between
//! consumers.

use crate::report_generator::ReportSource;
use crate::types::GeneratedReports;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{info, warn};

/// Interval-driven background refresh with last-known-good fallback
pub struct Revalidator {
    source: Arc<dyn ReportSource>,
    current: Arc<RwLock<Arc<GeneratedReports>>>,
    refresh_interval: Duration,
    shutdown: Option<mpsc::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Revalidator {
    /// Create a revalidator seeded with a fallback value.
    ///
    /// The fallback is served until the first successful refresh; nothing is
    /// fetched at construction time.
    pub fn new(
        source: Arc<dyn ReportSource>,
        fallback: Arc<GeneratedReports>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            source,
            current: Arc::new(RwLock::new(fallback)),
            refresh_interval,
            shutdown: None,
            task: None,
        }
    }

    /// The current reports value (possibly the fallback, possibly stale)
    pub async fn current(&self) -> Arc<GeneratedReports> {
        self.current.read().await.clone()
    }

    /// Whether the background task is running
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Start the background refresh task. Idempotent while running.
    ///
    /// The first tick fires one full interval after start; the seed value
    /// covers the time before that.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let source = self.source.clone();
        let current = self.current.clone();
        let refresh_interval = self.refresh_interval;

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + refresh_interval, refresh_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        refresh_once(source.as_ref(), &current).await;
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        self.shutdown = Some(shutdown_tx);
        self.task = Some(task);
    }

    /// Stop the background task and wait for it to exit. Idempotent.
    pub async fn stop(&mut self) {
        // dropping the sender also wakes the task; an explicit send makes the
        // shutdown ordering deterministic
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(()).await;
        }
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
            && e.is_panic()
        {
            warn!("revalidation task panicked during shutdown: {e:?}");
        }
    }
}

/// One refresh attempt. Errors and all-zero results are downgraded to a
/// warning; the previous value stays in place.
async fn refresh_once(source: &dyn ReportSource, current: &RwLock<Arc<GeneratedReports>>) {
    match source.generate().await {
        Ok(reports) if reports.passes_sanity_check() => {
            info!(generated_at = %reports.generated_at, "revalidated reports");
            *current.write().await = Arc::new(reports);
        }
        Ok(_) => {
            warn!("revalidated reports failed sanity check; keeping last known-good value");
        }
        Err(e) => {
            warn!("revalidation failed: {e}; keeping last known-good value");
        }
    }
}
