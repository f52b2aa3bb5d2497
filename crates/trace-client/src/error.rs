//! Error types for the sync client

use thiserror::Error;
use trace_core::Generation;

/// Failure reported by an object store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Object store error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Payload too large: {size} bytes exceeds limit of {limit}")]
    TooLarge { size: u64, limit: u64 },

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Object store unavailable: {0}")]
    Unavailable(String),
}

/// Anything that prevented a fresh payload from being accepted
#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to decode positive list: {0}")]
    Decode(#[from] trace_core::Error),
}

/// Outcome of a positive list load that did not produce a new snapshot
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("Positive list already current at generation {generation}")]
    NoUpdateNeeded { generation: Generation },
}

impl SyncError {
    /// True when the cached snapshot is already current
    pub fn is_benign(&self) -> bool {
        matches!(self, SyncError::NoUpdateNeeded { .. })
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        SyncError::Transport(TransportError::Store(err))
    }
}

impl From<trace_core::Error> for SyncError {
    fn from(err: trace_core::Error) -> Self {
        SyncError::Transport(TransportError::Decode(err))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
