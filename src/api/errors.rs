//! # API Errors
//!
//! Request-level error type with its HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::query::QueryError;
use crate::render::RenderError;
use crate::schema::SchemaError;

/// Result type for request handling
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Malformed filter, sort, pagination, or value
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Unknown response format
    #[error("Invalid response format: {0}.")]
    UnknownFormat(String),

    /// Unknown record type in the path
    #[error("Unknown object type: {0}")]
    UnknownType(String),

    /// No record with the requested identifier
    #[error("No {0} object with id {1}")]
    ObjectNotFound(String, String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Renderer rejected the primitive tree
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Schema registry missing or malformed
    #[error("Schema configuration error: {0}")]
    Schema(#[from] SchemaError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Query(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownFormat(_) => StatusCode::BAD_REQUEST,

            ApiError::UnknownType(_) => StatusCode::NOT_FOUND,
            ApiError::ObjectNotFound(_, _) => StatusCode::NOT_FOUND,

            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Schema(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Query(QueryError::InvalidPagination).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UnknownType("widgets".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Render(RenderError::UnrenderableKey("1x".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_query_error_message_passes_through() {
        let err = ApiError::from(QueryError::NotFilterable("city".to_string()));
        assert_eq!(err.to_string(), "Cannot filter on field: city");
    }
}
