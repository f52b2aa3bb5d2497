//! Positive list wire format

use serde::{Deserialize, Serialize};

/// An identifier published as belonging to a confirmed-positive individual
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositiveContact {
    /// Temp ID (opaque) reported by the positive individual's device
    pub uuid: String,
}

impl PositiveContact {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self { uuid: uuid.into() }
    }
}

/// Decoded positive list payload: `{"data": [{"uuid": "..."}, ...]}`
///
/// Unknown fields are ignored at every level. A missing or non-array `data`
/// field is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositiveContactList {
    pub data: Vec<PositiveContact>,
}

impl PositiveContactList {
    pub fn new(data: Vec<PositiveContact>) -> Self {
        Self { data }
    }

    /// Build a list from bare uuids
    pub fn from_uuids<I, S>(uuids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data: uuids.into_iter().map(PositiveContact::new).collect(),
        }
    }

    /// Decode a downloaded payload
    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        if bytes.is_empty() {
            return Err(crate::Error::InvalidPayload("empty body".to_string()));
        }
        let list = serde_json::from_slice(bytes)?;
        Ok(list)
    }

    /// Encode as the wire payload
    pub fn to_vec(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn uuids(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|c| c.uuid.as_str())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
