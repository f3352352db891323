//! # REST API Errors
//!
//! Every failure renders as the error envelope. Record operations only
//! produce 400, 404 and 500; a known path hit with the wrong method gets 405.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event};
use crate::record::StoreError;

use super::response::Envelope;

/// Result type for REST operations
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Required field missing or a field has the wrong shape
    #[error("{0}")]
    Validation(String),

    /// Body is not a JSON object
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Query parameter could not be parsed
    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    /// No record with the requested id
    #[error("{0} not found")]
    RecordNotFound(&'static str),

    /// No route or static file matches the path
    #[error("The requested URL was not found on the server.")]
    RouteNotFound,

    /// Path exists but does not accept the request method
    #[error("The method is not allowed for the requested URL.")]
    MethodNotAllowed,

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidQueryParam(_) => StatusCode::BAD_REQUEST,

            ApiError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        let event = if status.is_server_error() {
            Event::RequestFailed
        } else {
            Event::RequestRejected
        };
        log_event_with_fields(
            event,
            &[("status", status.as_str()), ("message", message.as_str())],
        );

        (status, Json(Envelope::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("Name is required".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidQueryParam("page".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::RecordNotFound("Item").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::RouteNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::Store(StoreError::LockPoisoned).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::RecordNotFound("User").to_string(), "User not found");
        // Store failures expose the underlying message unchanged
        assert_eq!(
            ApiError::Store(StoreError::LockPoisoned).to_string(),
            "Record store lock poisoned"
        );
    }

    #[tokio::test]
    async fn test_error_renders_envelope() {
        let response = ApiError::RecordNotFound("Item").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": "error", "message": "Item not found", "data": null})
        );
    }
}
