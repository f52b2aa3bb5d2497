//! HTTP object store client
//!
//! Speaks a Firebase-Storage-style REST protocol:
//! - `GET {base}/o/{key}` returns object metadata as JSON
//! - `GET {base}/o/{key}?alt=media` returns the object body
//!
//! Metadata `generation` and `size` may be JSON numbers or decimal strings.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Deserializer};
use trace_core::{Generation, SyncConfig};

use crate::error::StoreError;
use crate::store::{ObjectMetadata, ObjectStore};

/// Metadata document returned by the store
#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(deserialize_with = "u64_from_string_or_number")]
    generation: Generation,
    #[serde(deserialize_with = "u64_from_string_or_number")]
    size: u64,
}

fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        String(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Object store reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    http: Client,
    base_url: Url,
}

impl HttpObjectStore {
    /// Create a store client with default timeouts
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::with_timeouts(base_url, Duration::from_secs(20), Duration::from_secs(10))
    }

    /// Create a store client using the timeouts from `config`
    pub fn from_config(config: &SyncConfig) -> Result<Self, StoreError> {
        Self::with_timeouts(
            &config.store_url,
            config.request_timeout(),
            config.connect_timeout(),
        )
    }

    pub fn with_timeouts(
        base_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of an object; the key is percent-encoded as a single path segment
    fn object_url(&self, key: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("o")
            .push(key);
        Ok(url)
    }

    async fn check_status(key: &str, resp: Response) -> Result<Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        match status {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(key.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(StoreError::PermissionDenied(key.to_string()))
            }
            _ => Err(StoreError::Status {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn metadata(&self, key: &str) -> Result<ObjectMetadata, StoreError> {
        let url = self.object_url(key)?;
        let resp = self.http.get(url).send().await?;
        let resp = Self::check_status(key, resp).await?;

        let body = resp.bytes().await?;
        let meta: MetadataResponse = serde_json::from_slice(&body)
            .map_err(|e| StoreError::InvalidMetadata(e.to_string()))?;

        tracing::trace!(
            key,
            name = meta.name.as_deref().unwrap_or(key),
            generation = meta.generation,
            size = meta.size,
            "Fetched object metadata"
        );

        Ok(ObjectMetadata {
            generation: meta.generation,
            size: meta.size,
        })
    }

    async fn data(&self, key: &str, max_bytes: u64) -> Result<Vec<u8>, StoreError> {
        let mut url = self.object_url(key)?;
        url.query_pairs_mut().append_pair("alt", "media");

        let resp = self.http.get(url).send().await?;
        let mut resp = Self::check_status(key, resp).await?;

        if let Some(len) = resp.content_length() {
            if len > max_bytes {
                return Err(StoreError::TooLarge {
                    size: len,
                    limit: max_bytes,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            let size = (body.len() + chunk.len()) as u64;
            if size > max_bytes {
                return Err(StoreError::TooLarge {
                    size,
                    limit: max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url() {
        let store = HttpObjectStore::new("http://localhost:3001/").unwrap();
        assert_eq!(
            store.object_url("positive_person_list.json").unwrap().as_str(),
            "http://localhost:3001/o/positive_person_list.json"
        );
    }

    #[test]
    fn test_object_url_with_prefix_and_nested_key() {
        let store = HttpObjectStore::new("http://store/v0/b/bucket").unwrap();
        assert_eq!(
            store.object_url("lists/positive.json").unwrap().as_str(),
            "http://store/v0/b/bucket/o/lists%2Fpositive.json"
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            HttpObjectStore::new("not a url"),
            Err(StoreError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpObjectStore::new("mailto:someone@example.com"),
            Err(StoreError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_metadata_string_fields() {
        let meta: MetadataResponse = serde_json::from_str(
            r#"{"name":"positive_person_list.json","bucket":"b","generation":"1588000000123456","size":"42"}"#,
        )
        .unwrap();
        assert_eq!(meta.generation, 1_588_000_000_123_456);
        assert_eq!(meta.size, 42);
    }

    #[test]
    fn test_metadata_numeric_fields() {
        let meta: MetadataResponse =
            serde_json::from_str(r#"{"generation":7,"size":0}"#).unwrap();
        assert_eq!(meta.generation, 7);
        assert!(meta.name.is_none());
    }

    #[test]
    fn test_metadata_rejects_bad_generation() {
        assert!(serde_json::from_str::<MetadataResponse>(r#"{"generation":"abc","size":1}"#).is_err());
        assert!(serde_json::from_str::<MetadataResponse>(r#"{"size":1}"#).is_err());
    }
}
