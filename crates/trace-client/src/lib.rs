//! trace-client: positive list sync and exposure matching
//!
//! - [`PositiveListCache`] pulls the published positive list from an
//!   [`ObjectStore`], skipping downloads when the remote generation has not
//!   advanced and never replacing a good snapshot with a bad payload.
//! - [`evaluator`] answers "am I positive?" and "have I been exposed?" against
//!   a snapshot, purely in memory.
//! - [`SyncService`] runs the cache on a schedule with a load deadline.

pub mod cache;
#[cfg(any(test, feature = "debug-hooks"))]
pub mod debug;
pub mod error;
pub mod evaluator;
pub mod http_store;
pub mod metrics;
pub mod service;
pub mod sources;
pub mod store;

pub use cache::{PositiveListCache, PositiveSnapshot};
#[cfg(any(test, feature = "debug-hooks"))]
pub use debug::DebugHooks;
pub use error::{StoreError, SyncError, TransportError};
pub use evaluator::{is_exposed, is_positive_self, ExposureEvaluator, ExposureStatus};
pub use http_store::HttpObjectStore;
pub use service::{SyncOutcome, SyncService};
pub use sources::{DeepContactLog, MemoryDeepContactLog, MemoryTempIdStore, TempIdStore};
pub use store::{MemoryObjectStore, ObjectMetadata, ObjectStore};
