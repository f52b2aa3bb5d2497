//! Periodic positive list sync
//!
//! Drives [`PositiveListCache::load`] on launch, on demand (e.g. when the
//! app returns to the foreground) and on a fixed interval, re-evaluating
//! exposure after every attempt. This is the layer that applies a deadline
//! to loads; the cache itself never times out.

use std::future::Future;
use std::sync::Arc;

use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};
use trace_core::{Generation, SyncConfig};

use crate::cache::PositiveListCache;
use crate::error::{StoreError, SyncError};
use crate::evaluator::{ExposureEvaluator, ExposureStatus};
use crate::http_store::HttpObjectStore;
use crate::metrics;
use crate::sources::{DeepContactLog, TempIdStore};

/// Result of one sync attempt
#[derive(Debug)]
pub enum SyncOutcome {
    /// A newer list was accepted
    Updated { generation: Generation, entries: usize },
    /// The cached list is already current
    Unchanged { generation: Generation },
    /// The load failed; the previous snapshot stays in use
    Failed(SyncError),
    /// The load did not finish within the configured deadline
    TimedOut,
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed(_) | SyncOutcome::TimedOut)
    }
}

/// Sync loop around a positive list cache and an exposure evaluator
pub struct SyncService {
    config: SyncConfig,
    cache: Arc<PositiveListCache>,
    evaluator: ExposureEvaluator,
}

impl SyncService {
    pub fn new(config: SyncConfig, cache: Arc<PositiveListCache>, evaluator: ExposureEvaluator) -> Self {
        Self {
            config,
            cache,
            evaluator,
        }
    }

    /// Wire an HTTP-backed cache from `config`
    pub fn from_config(
        config: SyncConfig,
        temp_ids: Arc<dyn TempIdStore>,
        contacts: Arc<dyn DeepContactLog>,
    ) -> Result<Self, StoreError> {
        let store = Arc::new(HttpObjectStore::from_config(&config)?);
        let cache = Arc::new(PositiveListCache::from_config(store, &config));
        let evaluator = ExposureEvaluator::new(temp_ids, contacts);
        Ok(Self::new(config, cache, evaluator))
    }

    pub fn cache(&self) -> &Arc<PositiveListCache> {
        &self.cache
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Attempt one load under the configured deadline
    pub async fn sync_once(&self) -> SyncOutcome {
        let deadline = self.config.load_timeout();

        match timeout(deadline, self.cache.load()).await {
            Ok(Ok(snapshot)) => SyncOutcome::Updated {
                generation: snapshot.generation.unwrap_or_default(),
                entries: snapshot.entries.len(),
            },
            Ok(Err(SyncError::NoUpdateNeeded { generation })) => {
                debug!(generation, "Positive list already current");
                SyncOutcome::Unchanged { generation }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Positive list sync failed, keeping cached list");
                SyncOutcome::Failed(e)
            }
            Err(_) => {
                warn!(
                    timeout_ms = deadline.as_millis() as u64,
                    "Positive list sync timed out, keeping cached list"
                );
                metrics::record_load_timeout();
                SyncOutcome::TimedOut
            }
        }
    }

    /// Evaluate exposure against the current snapshot without any I/O
    pub fn check_exposure(&self) -> ExposureStatus {
        let snapshot = self.cache.snapshot();
        let status = self.evaluator.evaluate(&snapshot);
        metrics::set_exposure_status(&status);
        status
    }

    /// Sync, then evaluate; what launch and foreground hooks call
    pub async fn refresh(&self) -> (SyncOutcome, ExposureStatus) {
        let outcome = self.sync_once().await;
        let status = self.check_exposure();
        (outcome, status)
    }

    /// Refresh on every poll interval until `shutdown` resolves
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            store = %self.config.store_url,
            key = %self.cache.key(),
            poll_interval_ms = self.config.poll_interval_ms,
            "Starting positive list sync"
        );

        let mut poll = interval(self.config.poll_interval());
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_status: Option<ExposureStatus> = None;

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Positive list sync stopped");
                    return;
                }
                _ = poll.tick() => {}
            }

            let (outcome, status) = self.refresh().await;
            if let SyncOutcome::Updated { generation, entries } = outcome {
                info!(generation, entries, "Positive list refreshed");
            }

            if last_status != Some(status) {
                if status.positive_self || status.exposed {
                    warn!(
                        positive_self = status.positive_self,
                        exposed = status.exposed,
                        "Exposure status changed"
                    );
                } else {
                    info!("No exposure detected");
                }
                last_status = Some(status);
            }
        }
    }
}
