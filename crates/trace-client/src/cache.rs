//! Generation-tracked cache of the published positive list
//!
//! The cache holds a single immutable [`PositiveSnapshot`] behind an
//! [`ArcSwap`]. A load either swaps in a complete new snapshot (generation
//! and entries together) or leaves the current one untouched, so readers
//! always see a consistent pair and never block on an in-flight load.
//!
//! Loads are serialized by an async mutex. A caller that queued behind a
//! successful load re-checks against the freshly committed generation and
//! gets [`SyncError::NoUpdateNeeded`] instead of downloading again.
//!
//! The cache never retries and never applies a deadline; callers wrap
//! [`PositiveListCache::load`] in their own timeout.

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use tokio::sync::Mutex;
use trace_core::constants::{MAX_PAYLOAD_BYTES, POSITIVE_LIST_OBJECT};
use trace_core::{Generation, PositiveContact, PositiveContactList, SyncConfig};

use crate::error::{Result, SyncError, TransportError};
use crate::metrics;
use crate::store::ObjectStore;

/// Accepted positive list together with the generation it was published at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositiveSnapshot {
    /// Generation of the accepted payload, `None` before the first load
    pub generation: Option<Generation>,
    /// Entries of the accepted payload, in payload order
    pub entries: Vec<PositiveContact>,
}

impl PositiveSnapshot {
    pub fn entries(&self) -> &[PositiveContact] {
        &self.entries
    }

    pub fn uuids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.uuid.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide cache of the remote positive list
pub struct PositiveListCache {
    store: Arc<dyn ObjectStore>,
    key: String,
    max_payload_bytes: u64,
    pub(crate) snapshot: ArcSwap<PositiveSnapshot>,
    load_lock: Mutex<()>,
}

impl PositiveListCache {
    /// Create an empty cache reading the well-known positive list object
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            key: POSITIVE_LIST_OBJECT.to_string(),
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            snapshot: ArcSwap::from_pointee(PositiveSnapshot::default()),
            load_lock: Mutex::new(()),
        }
    }

    /// Create an empty cache using the object key and size limit from `config`
    pub fn from_config(store: Arc<dyn ObjectStore>, config: &SyncConfig) -> Self {
        Self::new(store)
            .with_key(config.object_key.clone())
            .with_max_payload_bytes(config.max_payload_bytes)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_max_payload_bytes(mut self, max_payload_bytes: u64) -> Self {
        self.max_payload_bytes = max_payload_bytes;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn max_payload_bytes(&self) -> u64 {
        self.max_payload_bytes
    }

    /// Current snapshot; cheap, never waits for a load
    pub fn snapshot(&self) -> Arc<PositiveSnapshot> {
        self.snapshot.load_full()
    }

    pub fn last_generation(&self) -> Option<Generation> {
        self.snapshot.load().generation
    }

    /// Copy of the currently accepted entries
    pub fn entries(&self) -> Vec<PositiveContact> {
        self.snapshot.load().entries.clone()
    }

    /// Fetch the positive list if the remote generation is newer than ours
    ///
    /// On success the new snapshot is committed and returned. Any failure
    /// leaves the previous snapshot in place.
    pub async fn load(&self) -> Result<Arc<PositiveSnapshot>> {
        let _guard = self.load_lock.lock().await;
        let started = Instant::now();

        let result = self.load_locked().await;
        metrics::record_load(&result, started.elapsed());

        result
    }

    async fn load_locked(&self) -> Result<Arc<PositiveSnapshot>> {
        let meta = self.store.metadata(&self.key).await.map_err(|e| {
            tracing::warn!(key = %self.key, error = %e, "Positive list metadata fetch failed");
            SyncError::from(e)
        })?;

        let last_generation = self.last_generation();
        tracing::debug!(
            key = %self.key,
            remote_generation = meta.generation,
            last_generation = ?last_generation,
            size = meta.size,
            "Checked positive list generation"
        );

        if let Some(last) = last_generation {
            if meta.generation <= last {
                return Err(SyncError::NoUpdateNeeded { generation: last });
            }
        }

        let body = self
            .store
            .data(&self.key, self.max_payload_bytes)
            .await
            .map_err(|e| {
                tracing::warn!(
                    key = %self.key,
                    generation = meta.generation,
                    error = %e,
                    "Positive list download failed"
                );
                SyncError::from(e)
            })?;

        let list = PositiveContactList::from_slice(&body).map_err(|e| {
            tracing::warn!(
                key = %self.key,
                generation = meta.generation,
                bytes = body.len(),
                error = %e,
                "Positive list payload rejected"
            );
            SyncError::Transport(TransportError::Decode(e))
        })?;

        let snapshot = Arc::new(PositiveSnapshot {
            generation: Some(meta.generation),
            entries: list.data,
        });
        self.snapshot.store(Arc::clone(&snapshot));

        tracing::info!(
            key = %self.key,
            generation = meta.generation,
            entries = snapshot.entries.len(),
            bytes = body.len(),
            "Positive list updated"
        );
        metrics::set_positive_list(meta.generation, snapshot.entries.len());

        Ok(snapshot)
    }
}

impl std::fmt::Debug for PositiveListCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.load();
        f.debug_struct("PositiveListCache")
            .field("key", &self.key)
            .field("max_payload_bytes", &self.max_payload_bytes)
            .field("generation", &snapshot.generation)
            .field("entries", &snapshot.entries.len())
            .finish()
    }
}
