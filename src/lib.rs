//! trace-sync: positive list sync and exposure matching
//!
//! Re-exports the workspace crates:
//! - [`trace_core`]: records, wire format, config
//! - [`trace_client`]: cache, evaluator, object stores, sync service
//! - [`trace_mock_store`]: HTTP object store for tests and local runs

pub use trace_client;
pub use trace_core;
pub use trace_mock_store;
