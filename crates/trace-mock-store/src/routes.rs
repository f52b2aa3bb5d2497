//! HTTP routes for the mock object store

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreServerError};
use crate::state::{ObjectMetadataResponse, SharedState};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub objects: usize,
}

/// Query parameters for object reads
#[derive(Debug, Deserialize)]
pub struct ReadQuery {
    /// `media` returns the body, anything else the metadata
    pub alt: Option<String>,
}

/// Query parameters for object writes
#[derive(Debug, Deserialize)]
pub struct PublishQuery {
    /// Explicit generation instead of bumping the current one
    pub generation: Option<u64>,
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let state = state.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        objects: state.object_count(),
    })
}

/// Object metadata, or the object body with `?alt=media`
async fn get_object(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    Query(query): Query<ReadQuery>,
) -> Result<Response> {
    let state = state.read().await;

    match query.alt.as_deref() {
        Some("media") => {
            let object = state.get(&key)?;
            Ok((
                [(header::CONTENT_TYPE, object.content_type.clone())],
                object.bytes.clone(),
            )
                .into_response())
        }
        None | Some("json") => Ok(Json(state.metadata(&key)?).into_response()),
        Some(other) => Err(StoreServerError::InvalidRequest(format!(
            "Unsupported alt: {}",
            other
        ))),
    }
}

/// Publish a new object body
async fn put_object(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    Query(query): Query<PublishQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ObjectMetadataResponse>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut state = state.write().await;
    state.publish(&key, body.to_vec(), content_type, query.generation)?;
    Ok(Json(state.metadata(&key)?))
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/o/{key}", get(get_object).put(put_object))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_shared_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn put(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_publish_then_read() {
        let router = create_router(create_shared_state("test"));

        let (status, body) = send(router.clone(), put("/o/list.json", r#"{"data":[]}"#)).await;
        assert_eq!(status, StatusCode::OK);
        let meta: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(meta["generation"], "1");

        let (status, body) = send(router.clone(), get("/o/list.json")).await;
        assert_eq!(status, StatusCode::OK);
        let meta: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(meta["size"], "11");

        let (status, body) = send(router, get("/o/list.json?alt=media")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, br#"{"data":[]}"#.to_vec());
    }

    #[tokio::test]
    async fn test_missing_object_is_404() {
        let router = create_router(create_shared_state("test"));
        let (status, _) = send(router.clone(), get("/o/missing.json")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(router, get("/o/missing.json?alt=media")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stale_generation_rejected() {
        let router = create_router(create_shared_state("test"));
        let (status, _) = send(router.clone(), put("/o/k?generation=5", "a")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(router.clone(), put("/o/k?generation=4", "b")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = send(router, get("/o/k?alt=xml")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let state = create_shared_state("test");
        let router = create_router(state.clone());
        send(router.clone(), put("/o/a", "x")).await;

        let (status, body) = send(router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["objects"], 1);
    }
}
