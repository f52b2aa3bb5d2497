//! Mock store error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreServerError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Generation {requested} is older than current generation {current}")]
    StaleGeneration { requested: u64, current: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for StoreServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreServerError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            StoreServerError::StaleGeneration { .. } => StatusCode::CONFLICT,
            StoreServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StoreServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, StoreServerError>;
