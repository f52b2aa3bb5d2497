//! Mock object store server

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::error::{Result, StoreServerError};
use crate::routes::create_router;
use crate::state::{create_shared_state, SharedState};

/// Object store serving the metadata/media protocol over HTTP
pub struct MockStoreServer {
    state: SharedState,
    addr: SocketAddr,
}

impl MockStoreServer {
    pub fn new(state: SharedState, addr: SocketAddr) -> Self {
        Self { state, addr }
    }

    /// Run until the process exits
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        serve(listener, self.state, shutdown).await
    }

    /// Get the server state for seeding objects
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }
}

/// Serve the store on an already-bound listener
pub async fn serve<F>(listener: TcpListener, state: SharedState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = create_router(state);

    tracing::info!("Mock object store listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| StoreServerError::Internal(e.to_string()))?;

    Ok(())
}

/// Builder for MockStoreServer
pub struct MockStoreBuilder {
    bucket: String,
    addr: SocketAddr,
    seed: Vec<(String, Vec<u8>)>,
}

impl MockStoreBuilder {
    pub fn new() -> Self {
        Self {
            bucket: "mock-bucket".to_string(),
            addr: ([127, 0, 0, 1], 3001).into(),
            seed: Vec::new(),
        }
    }

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.addr = ([0, 0, 0, 0], port).into();
        self
    }

    /// Publish an object at generation 1 when the server is built
    pub fn seed(mut self, key: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.seed.push((key.into(), bytes));
        self
    }

    pub async fn build(self) -> Result<MockStoreServer> {
        let state = create_shared_state(self.bucket);
        {
            let mut guard = state.write().await;
            for (key, bytes) in self.seed {
                guard.publish(&key, bytes, None, None)?;
            }
        }
        Ok(MockStoreServer::new(state, self.addr))
    }
}

impl Default for MockStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
