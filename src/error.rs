//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::event_store::EventStoreError;
use crate::release::ReleaseError;
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Release not found: {0}")]
    ReleaseNotFound(i64),

    #[error("Not found")]
    NotFound,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<EventStoreError> for AppError {
    fn from(err: EventStoreError) -> Self {
        match err {
            EventStoreError::InvalidEventData(e) => AppError::Domain(e),
            EventStoreError::Store(e) => AppError::Store(e),
        }
    }
}

impl From<ReleaseError> for AppError {
    fn from(err: ReleaseError) -> Self {
        match err {
            ReleaseError::NotFound(id) => AppError::ReleaseNotFound(id),
            ReleaseError::Domain(e) => AppError::Domain(e),
            ReleaseError::EventStore(e) => e.into(),
            ReleaseError::Store(e) => AppError::Store(e),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            // 404 Not Found
            AppError::ReleaseNotFound(id) => {
                (StatusCode::NOT_FOUND, "release_not_found", Some(id.to_string()))
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", None),

            // Domain errors - validation failures are the caller's fault
            AppError::Domain(domain_err) => match domain_err {
                DomainError::MissingField(field) => {
                    (StatusCode::BAD_REQUEST, "missing_field", Some(field.to_string()))
                }
                DomainError::FieldTooLong { field, .. } => {
                    (StatusCode::BAD_REQUEST, "field_too_long", Some(field.to_string()))
                }
                DomainError::InvalidLabelType(value) => {
                    (StatusCode::BAD_REQUEST, "invalid_label_type", Some(value.clone()))
                }
                DomainError::InvalidSection(value) => {
                    (StatusCode::BAD_REQUEST, "invalid_section", Some(value.clone()))
                }
                DomainError::InvalidDate(value) => {
                    (StatusCode::BAD_REQUEST, "invalid_date", Some(value.clone()))
                }
                DomainError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
                }
            },

            // 500 Internal Server Error
            AppError::Store(StoreError::Unavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", None)
            }
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, error_code, "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_bad_requests() {
        let err = AppError::from(EventStoreError::from(DomainError::MissingField("message")));
        let (status, code, details) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "missing_field");
        assert_eq!(details.as_deref(), Some("message"));
    }

    #[test]
    fn test_release_not_found_maps_to_404() {
        let err = AppError::from(ReleaseError::NotFound(7));
        let (status, code, _) = err.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "release_not_found");
    }

    #[test]
    fn test_store_unavailable_maps_to_503() {
        let err = AppError::from(ReleaseError::EventStore(EventStoreError::Store(
            StoreError::Unavailable("read only".to_string()),
        )));
        let (status, code, details) = err.status_and_code();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "storage_unavailable");
        assert!(details.is_none());
    }
}
