//! Debug-only cache mutation hooks
//!
//! Only compiled for tests or with the `debug-hooks` feature. These bypass
//! the remote fetch path and must never ship in production builds.

use std::sync::Arc;

use trace_core::PositiveContact;

use crate::cache::{PositiveListCache, PositiveSnapshot};

/// Direct state injection for test scaffolding
pub trait DebugHooks {
    /// Add `uuid` to the current entries unless already present
    fn append_positive_contact(&self, uuid: &str);

    /// Forget the cached generation so the next load re-fetches
    fn reset_generation(&self);
}

impl DebugHooks for PositiveListCache {
    fn append_positive_contact(&self, uuid: &str) {
        self.snapshot.rcu(|current| {
            if current.uuids().any(|u| u == uuid) {
                return Arc::clone(current);
            }
            let mut entries = current.entries.clone();
            entries.push(PositiveContact::new(uuid));
            Arc::new(PositiveSnapshot {
                generation: current.generation,
                entries,
            })
        });
        tracing::debug!(uuid, "Injected positive contact");
    }

    fn reset_generation(&self) {
        self.snapshot.rcu(|current| {
            Arc::new(PositiveSnapshot {
                generation: None,
                entries: current.entries.clone(),
            })
        });
        tracing::debug!("Reset positive list generation");
    }
}
