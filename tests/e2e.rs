//! End-to-end tests for positive list sync over HTTP
//!
//! Tests the full pipeline: mock store -> HTTP object store -> cache -> evaluator

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::Client;
use tokio::net::TcpListener;
use trace_client::{
    is_exposed, is_positive_self, DebugHooks, HttpObjectStore, ObjectStore, PositiveListCache,
    StoreError, SyncError, TransportError,
};
use trace_core::constants::POSITIVE_LIST_OBJECT;
use trace_core::PositiveContact;
use trace_mock_store::{create_shared_state, serve, SharedState};

/// Test harness running a mock object store on a local port
pub struct TestHarness {
    pub store_url: String,
    pub state: SharedState,
    pub http: Client,
    _shutdown: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestHarness {
    pub async fn new() -> Self {
        let state = create_shared_state("e2e");
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Bind should succeed");
        let addr = listener.local_addr().expect("Listener has an address");
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(serve(listener, state.clone(), async {
            let _ = shutdown_rx.await;
        }));

        Self {
            store_url: format!("http://{}", addr),
            state,
            http: Client::new(),
            _shutdown: Some(shutdown_tx),
        }
    }

    /// Publish a body through the store's HTTP API
    pub async fn publish(&self, body: &str, generation: Option<u64>) -> reqwest::StatusCode {
        let mut url = format!("{}/o/{}", self.store_url, POSITIVE_LIST_OBJECT);
        if let Some(generation) = generation {
            url.push_str(&format!("?generation={}", generation));
        }
        self.http
            .put(url)
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Publish request should succeed")
            .status()
    }

    pub fn store(&self) -> Arc<HttpObjectStore> {
        Arc::new(HttpObjectStore::new(&self.store_url).expect("Valid store URL"))
    }

    pub fn cache(&self) -> PositiveListCache {
        PositiveListCache::new(self.store())
    }
}

fn uuids(cache: &PositiveListCache) -> Vec<String> {
    cache.entries().into_iter().map(|c| c.uuid).collect()
}

#[tokio::test]
async fn test_scenario_over_http() {
    let harness = TestHarness::new().await;
    let cache = harness.cache();

    assert!(harness.publish(r#"{"data":[{"uuid":"U1"}]}"#, None).await.is_success());
    let snapshot = cache.load().await.expect("First load should succeed");
    assert_eq!(snapshot.entries, vec![PositiveContact::new("U1")]);
    assert_eq!(snapshot.generation, Some(1));

    let err = cache.load().await.unwrap_err();
    assert!(matches!(err, SyncError::NoUpdateNeeded { generation: 1 }));

    assert!(harness
        .publish(r#"{"data":[{"uuid":"U1"},{"uuid":"U2"}]}"#, None)
        .await
        .is_success());
    let snapshot = cache.load().await.expect("Second load should succeed");
    assert_eq!(snapshot.generation, Some(2));
    assert_eq!(uuids(&cache), vec!["U1", "U2"]);
}

#[tokio::test]
async fn test_metadata_matches_published_object() {
    let harness = TestHarness::new().await;
    let body = r#"{"data":[{"uuid":"A"}]}"#;
    harness.publish(body, Some(1_588_000_000_000_123)).await;

    let meta = harness.store().metadata(POSITIVE_LIST_OBJECT).await.unwrap();
    assert_eq!(meta.generation, 1_588_000_000_000_123);
    assert_eq!(meta.size, body.len() as u64);
}

#[tokio::test]
async fn test_same_generation_is_not_refetched() {
    let harness = TestHarness::new().await;
    let cache = harness.cache();

    harness.publish(r#"{"data":[{"uuid":"A"}]}"#, Some(5)).await;
    cache.load().await.unwrap();

    // Content changes without a generation bump are not picked up
    harness.publish(r#"{"data":[{"uuid":"B"}]}"#, Some(5)).await;
    assert!(cache.load().await.unwrap_err().is_benign());
    assert_eq!(uuids(&cache), vec!["A"]);
}

#[tokio::test]
async fn test_size_boundary_over_http() {
    let harness = TestHarness::new().await;
    let base = r#"{"data":[{"uuid":"A"}]}"#;
    let limit = base.len() as u64 + 8;
    let cache = PositiveListCache::new(harness.store()).with_max_payload_bytes(limit);

    let exact = format!("{:width$}", base, width = limit as usize);
    assert_eq!(exact.len() as u64, limit);
    harness.publish(&exact, None).await;
    cache.load().await.expect("Payload at the limit should load");

    let over = format!("{:width$}", base, width = limit as usize + 1);
    harness.publish(&over, None).await;
    let err = cache.load().await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Transport(TransportError::Store(StoreError::TooLarge { .. }))
    ));
    assert_eq!(cache.last_generation(), Some(1));
}

#[tokio::test]
async fn test_corrupt_payload_keeps_snapshot() {
    let harness = TestHarness::new().await;
    let cache = harness.cache();

    harness.publish(r#"{"data":[{"uuid":"A"}]}"#, None).await;
    cache.load().await.unwrap();

    harness.publish(r#"{"data":"oops"}"#, None).await;
    let err = cache.load().await.unwrap_err();
    assert!(matches!(err, SyncError::Transport(TransportError::Decode(_))));
    assert_eq!(cache.last_generation(), Some(1));
    assert_eq!(uuids(&cache), vec!["A"]);
}

#[tokio::test]
async fn test_missing_object_is_not_found() {
    let harness = TestHarness::new().await;
    let err = harness.cache().load().await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Transport(TransportError::Store(StoreError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_unreachable_store_is_transport_failure() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = Arc::new(HttpObjectStore::new(&format!("http://{}", addr)).unwrap());
    let cache = PositiveListCache::new(store);
    let err = cache.load().await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Transport(TransportError::Store(StoreError::Http(_)))
    ));
    assert_eq!(cache.last_generation(), None);
}

#[tokio::test]
async fn test_matching_against_fetched_list() {
    let harness = TestHarness::new().await;
    let cache = harness.cache();
    harness
        .publish(r#"{"data":[{"uuid":"B"},{"uuid":"C"}],"published_at":"2020-05-01"}"#, None)
        .await;

    let snapshot = cache.load().await.unwrap();
    assert!(is_positive_self(["A", "B"], &snapshot.entries));
    assert!(!is_positive_self(["A"], &snapshot.entries));
    assert!(is_exposed(["C"], &snapshot.entries));
    assert!(!is_exposed(std::iter::empty::<&str>(), &snapshot.entries));
}

#[tokio::test]
async fn test_debug_reset_refetches_over_http() {
    let harness = TestHarness::new().await;
    let cache = harness.cache();
    harness.publish(r#"{"data":[{"uuid":"A"}]}"#, None).await;
    cache.load().await.unwrap();

    cache.append_positive_contact("LOCAL");
    assert_eq!(uuids(&cache), vec!["A", "LOCAL"]);

    cache.reset_generation();
    cache.load().await.expect("Reset should force a re-fetch");
    assert_eq!(uuids(&cache), vec!["A"]);
    assert_eq!(harness.state.read().await.object_count(), 1);
}
