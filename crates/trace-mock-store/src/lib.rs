//! trace-mock-store: in-memory object store for positive list testing
//!
//! Serves the same protocol the sync client's HTTP store speaks:
//! metadata at `GET /o/{key}`, body at `GET /o/{key}?alt=media`, and
//! publishing via `PUT /o/{key}` which bumps the object's generation.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::StoreServerError;
pub use routes::create_router;
pub use server::{serve, MockStoreBuilder, MockStoreServer};
pub use state::{create_shared_state, ObjectMetadataResponse, SharedState, StoreState, StoredObject};
