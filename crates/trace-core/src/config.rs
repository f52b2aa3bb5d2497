//! Sync configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{MAX_PAYLOAD_BYTES, POSITIVE_LIST_OBJECT};

/// Configuration for the positive list sync client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the object store (e.g. `http://localhost:3001`)
    pub store_url: String,
    /// Object key of the positive list
    #[serde(default = "default_object_key")]
    pub object_key: String,
    /// Maximum accepted payload size in bytes
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: u64,
    /// Interval between background syncs
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Deadline for a whole load (metadata + body)
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,
    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// HTTP connect timeout
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// JSON file with own temp ID records
    #[serde(default)]
    pub temp_ids_path: Option<PathBuf>,
    /// JSON file with deep contact records
    #[serde(default)]
    pub contacts_path: Option<PathBuf>,
}

fn default_object_key() -> String {
    POSITIVE_LIST_OBJECT.to_string()
}

fn default_max_payload_bytes() -> u64 {
    MAX_PAYLOAD_BYTES
}

fn default_poll_interval_ms() -> u64 {
    300_000
}

fn default_load_timeout_ms() -> u64 {
    30_000
}

fn default_request_timeout_ms() -> u64 {
    20_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

/// Whole milliseconds, rounding sub-millisecond durations up so a non-zero
/// duration never becomes zero
fn duration_to_ms(duration: Duration) -> u64 {
    let ms = duration.as_millis().min(u64::MAX as u128) as u64;
    if ms == 0 && !duration.is_zero() {
        1
    } else {
        ms
    }
}

impl SyncConfig {
    /// Create a configuration pointing at the given store with default settings
    pub fn new(store_url: impl Into<String>) -> Self {
        Self {
            store_url: store_url.into(),
            object_key: default_object_key(),
            max_payload_bytes: default_max_payload_bytes(),
            poll_interval_ms: default_poll_interval_ms(),
            load_timeout_ms: default_load_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            temp_ids_path: None,
            contacts_path: None,
        }
    }

    pub fn with_object_key(mut self, key: impl Into<String>) -> Self {
        self.object_key = key.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = duration_to_ms(interval);
        self
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout_ms = duration_to_ms(timeout);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = duration_to_ms(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = duration_to_ms(timeout);
        self
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Reject settings the client cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.store_url.trim().is_empty() {
            return Err(crate::Error::InvalidConfig("store_url is empty".to_string()));
        }
        if self.object_key.is_empty() {
            return Err(crate::Error::InvalidConfig("object_key is empty".to_string()));
        }
        if self.max_payload_bytes == 0 {
            return Err(crate::Error::InvalidConfig(
                "max_payload_bytes must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("poll_interval_ms", self.poll_interval_ms),
            ("load_timeout_ms", self.load_timeout_ms),
            ("request_timeout_ms", self.request_timeout_ms),
            ("connect_timeout_ms", self.connect_timeout_ms),
        ] {
            if value == 0 {
                return Err(crate::Error::InvalidConfig(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("http://localhost:3001")
    }
}
