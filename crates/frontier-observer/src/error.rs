//! Error types for the observer API.
//!
//! [`ObserverError`] converts into an HTTP response with a JSON body of
//! the form `{"error": "...", "status": 404}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use frontier_core::store::StoreError;

/// Errors that can occur in the observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A path segment could not be read as a floor.
    #[error("invalid floor: {0}")]
    InvalidFloor(String),

    /// The request body or query was not acceptable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_)
            | Self::Store(StoreError::UnknownFloor(_) | StoreError::UnknownRoom(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::InvalidFloor(_)
            | Self::InvalidRequest(_)
            | Self::Store(StoreError::NonFiniteLevel { .. }) => StatusCode::BAD_REQUEST,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
