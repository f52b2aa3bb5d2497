//! Object store abstraction
//!
//! The cache only needs two things from a backend: a cheap metadata probe
//! that reports the object's generation, and a size-bounded body read.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use trace_core::Generation;

use crate::error::StoreError;

/// Metadata of a remote object, fetched without downloading the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub generation: Generation,
    pub size: u64,
}

/// Key-value blob store with a generation counter per object
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch generation and size for `key`
    async fn metadata(&self, key: &str) -> Result<ObjectMetadata, StoreError>;

    /// Download the body of `key`, failing with [`StoreError::TooLarge`] if it
    /// exceeds `max_bytes`
    async fn data(&self, key: &str, max_bytes: u64) -> Result<Vec<u8>, StoreError>;
}

#[derive(Debug, Clone)]
struct StoredObject {
    generation: Generation,
    bytes: Vec<u8>,
}

/// In-process object store
///
/// Publishing bumps the object's generation, mirroring a real blob store.
/// Failures and latency can be injected to exercise the cache's error paths.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    fail_metadata: AtomicBool,
    fail_data: AtomicBool,
    latency: Mutex<Option<Duration>>,
    metadata_requests: AtomicUsize,
    data_requests: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add latency to every call
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap_or_else(PoisonError::into_inner) = Some(latency);
        self
    }

    /// Store `bytes` under `key` as the next generation and return it
    pub fn publish(&self, key: &str, bytes: impl Into<Vec<u8>>) -> Generation {
        let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = objects.get(key).map(|o| o.generation + 1).unwrap_or(1);
        objects.insert(
            key.to_string(),
            StoredObject {
                generation,
                bytes: bytes.into(),
            },
        );
        generation
    }

    /// Store `bytes` under `key` with an explicit generation
    pub fn put_with_generation(&self, key: &str, generation: Generation, bytes: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key.to_string(),
                StoredObject {
                    generation,
                    bytes: bytes.into(),
                },
            );
    }

    pub fn set_metadata_failure(&self, fail: bool) {
        self.fail_metadata.store(fail, Ordering::SeqCst);
    }

    pub fn set_data_failure(&self, fail: bool) {
        self.fail_data.store(fail, Ordering::SeqCst);
    }

    /// Number of metadata probes served
    pub fn metadata_requests(&self) -> usize {
        self.metadata_requests.load(Ordering::SeqCst)
    }

    /// Number of body downloads served
    pub fn data_requests(&self) -> usize {
        self.data_requests.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn get(&self, key: &str) -> Result<StoredObject, StoreError> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn metadata(&self, key: &str) -> Result<ObjectMetadata, StoreError> {
        self.metadata_requests.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_metadata.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("metadata request failed".to_string()));
        }

        let object = self.get(key)?;
        Ok(ObjectMetadata {
            generation: object.generation,
            size: object.bytes.len() as u64,
        })
    }

    async fn data(&self, key: &str, max_bytes: u64) -> Result<Vec<u8>, StoreError> {
        self.data_requests.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_data.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("data request failed".to_string()));
        }

        let object = self.get(key)?;
        let size = object.bytes.len() as u64;
        if size > max_bytes {
            return Err(StoreError::TooLarge {
                size,
                limit: max_bytes,
            });
        }
        Ok(object.bytes)
    }
}
