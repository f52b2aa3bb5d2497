//! trace-core: Core types for positive-list sync and exposure matching
//!
//! This crate defines the data shared by the sync engine and its collaborators:
//! - Own temp IDs: rotating pseudonymous identifiers with validity windows
//! - Deep contacts: temp IDs observed from peers during proximity events
//! - Positive list: identifiers published by the authority as confirmed-positive
//!
//! # Privacy Model
//!
//! Matching happens entirely on-device. The remote object store only ever
//! serves the published positive list; it never learns which temp IDs the
//! device holds or observed.
//!
//! | Information | Remote Store Knowledge |
//! |-------------|------------------------|
//! | Own temp IDs | NO |
//! | Observed deep contacts | NO |
//! | Exposure verdict | NO |
//! | Fetch timing, client identity | YES - via network metadata |
//!
//! Temp IDs are opaque strings; how they are generated is not this crate's
//! concern.

mod config;
mod error;
mod positive;
mod records;

pub use config::SyncConfig;
pub use error::Error;
pub use positive::{PositiveContact, PositiveContactList};
pub use records::{load_records, DeepContactRecord, TempIdRecord};

pub type Result<T> = std::result::Result<T, Error>;

/// Generation marker attached to a remote object
pub type Generation = u64;

/// Constants shared by the client and the mock store
pub mod constants {
    /// Well-known object key of the published positive list
    pub const POSITIVE_LIST_OBJECT: &str = "positive_person_list.json";

    /// Upper bound on a positive list download (1 MiB)
    pub const MAX_PAYLOAD_BYTES: u64 = 1024 * 1024;
}
