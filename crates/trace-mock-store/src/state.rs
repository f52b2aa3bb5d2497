//! Mock store state: objects with per-object generation counters

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Result, StoreServerError};

/// A stored object body and its generation
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub generation: u64,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Metadata document served for `GET /o/{key}`
///
/// Numeric fields are strings, matching what Firebase Storage returns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadataResponse {
    pub name: String,
    pub bucket: String,
    pub generation: String,
    pub size: String,
    pub content_type: String,
}

/// All objects held by the mock store
#[derive(Debug)]
pub struct StoreState {
    bucket: String,
    objects: HashMap<String, StoredObject>,
}

impl StoreState {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: HashMap::new(),
        }
    }

    /// Store `bytes` under `key`
    ///
    /// Without an explicit generation the object's generation is bumped by
    /// one. An explicit generation may repeat the current one (content change
    /// without a generation bump) but may not go backwards.
    pub fn publish(
        &mut self,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<String>,
        generation: Option<u64>,
    ) -> Result<&StoredObject> {
        if key.is_empty() {
            return Err(StoreServerError::InvalidRequest("empty object key".to_string()));
        }

        let current = self.objects.get(key).map(|o| o.generation);
        let generation = match (generation, current) {
            (Some(requested), Some(current)) if requested < current => {
                return Err(StoreServerError::StaleGeneration { requested, current });
            }
            (Some(requested), _) => requested,
            (None, Some(current)) => current + 1,
            (None, None) => 1,
        };

        let object = StoredObject {
            generation,
            bytes,
            content_type: content_type.unwrap_or_else(|| "application/json".to_string()),
        };
        self.objects.insert(key.to_string(), object);

        tracing::info!(key, generation, "Object published");

        self.get(key)
    }

    pub fn get(&self, key: &str) -> Result<&StoredObject> {
        self.objects
            .get(key)
            .ok_or_else(|| StoreServerError::NotFound(key.to_string()))
    }

    pub fn metadata(&self, key: &str) -> Result<ObjectMetadataResponse> {
        let object = self.get(key)?;
        Ok(ObjectMetadataResponse {
            name: key.to_string(),
            bucket: self.bucket.clone(),
            generation: object.generation.to_string(),
            size: object.bytes.len().to_string(),
            content_type: object.content_type.clone(),
        })
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

/// Shared store state type
pub type SharedState = Arc<tokio::sync::RwLock<StoreState>>;

/// Create shared state for a bucket
pub fn create_shared_state(bucket: impl Into<String>) -> SharedState {
    Arc::new(tokio::sync::RwLock::new(StoreState::new(bucket)))
}
