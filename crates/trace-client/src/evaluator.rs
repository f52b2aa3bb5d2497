//! Exposure evaluation
//!
//! Pure set-intersection checks between local identifiers and a positive
//! list snapshot. Nothing here performs I/O or touches the cache; callers
//! pass the snapshot they want evaluated.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use trace_core::PositiveContact;

use crate::cache::PositiveSnapshot;
use crate::sources::{DeepContactLog, TempIdStore};

/// True iff any of `ids` appears among the published uuids
fn intersects<'a, I>(ids: I, positives: &[PositiveContact]) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    if positives.is_empty() {
        return false;
    }
    let published: HashSet<&str> = positives.iter().map(|c| c.uuid.as_str()).collect();
    ids.into_iter().any(|id| published.contains(id))
}

/// Whether one of the device's own temp IDs has been published as positive
pub fn is_positive_self<'a, I>(own_temp_ids: I, positives: &[PositiveContact]) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    intersects(own_temp_ids, positives)
}

/// Whether any observed deep contact has been published as positive
pub fn is_exposed<'a, I>(deep_contact_ids: I, positives: &[PositiveContact]) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    intersects(deep_contact_ids, positives)
}

/// Both verdicts for one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExposureStatus {
    pub positive_self: bool,
    pub exposed: bool,
}

/// Evaluates the local record stores against a positive list snapshot
#[derive(Clone)]
pub struct ExposureEvaluator {
    temp_ids: Arc<dyn TempIdStore>,
    contacts: Arc<dyn DeepContactLog>,
}

impl ExposureEvaluator {
    pub fn new(temp_ids: Arc<dyn TempIdStore>, contacts: Arc<dyn DeepContactLog>) -> Self {
        Self { temp_ids, contacts }
    }

    pub fn is_positive_self(&self, snapshot: &PositiveSnapshot) -> bool {
        let records = self.temp_ids.temp_ids();
        is_positive_self(records.iter().map(|r| r.temp_id.as_str()), &snapshot.entries)
    }

    pub fn is_exposed(&self, snapshot: &PositiveSnapshot) -> bool {
        let records = self.contacts.deep_contacts();
        is_exposed(records.iter().map(|r| r.temp_id.as_str()), &snapshot.entries)
    }

    pub fn evaluate(&self, snapshot: &PositiveSnapshot) -> ExposureStatus {
        ExposureStatus {
            positive_self: self.is_positive_self(snapshot),
            exposed: self.is_exposed(snapshot),
        }
    }
}
