//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as
//! `{"success": false, "error": {"message", "details"?}}`; server faults are
//! captured to Sentry and reported to the client with a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ordercast_core::StatusError;
use ordercast_core::validate::ValidationError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::db::StoreError;
use crate::services::ServiceError;

/// Application-level error type for the HTTP API.
#[derive(Debug, Error)]
pub enum AppError {
    /// An operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The request payload or path failed validation.
    #[error("{}", .0.message)]
    Validation(#[from] ValidationError),

    /// Resource or route not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),
}

impl From<StatusError> for AppError {
    fn from(err: StatusError) -> Self {
        Self::Service(err.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Service(err.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: ErrorDetail<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorDetail<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Service(ServiceError::Store(
                StoreError::UserNotFound(_)
                | StoreError::OrderNotFound(_)
                | StoreError::InvalidReference(_),
            ))
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Service(
                ServiceError::Store(StoreError::DuplicateEmail) | ServiceError::InvalidStatus(_),
            )
            | Self::Validation(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Service(ServiceError::Store(StoreError::IdsExhausted(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error.".to_string()
        } else {
            self.to_string()
        };
        let details = match &self {
            Self::Validation(err) => err.details.as_ref(),
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                message: &message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use ordercast_core::{OrderId, UserId};
    use serde_json::json;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::from(StoreError::UserNotFound(UserId::new(1))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StoreError::InvalidReference(UserId::new(1))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StoreError::OrderNotFound(OrderId::new(1))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StoreError::DuplicateEmail).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(StatusError {
                input: "BOGUS".to_string()
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(StoreError::IdsExhausted("user")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_error_carries_details() {
        let err = ValidationError::with_details(
            "Validation failed.",
            json!({"email": "Email must be a valid email address."}),
        );
        let (status, body) = render(err.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": {
                    "message": "Validation failed.",
                    "details": {"email": "Email must be a valid email address."}
                }
            })
        );
    }

    #[tokio::test]
    async fn test_not_found_message_passes_through() {
        let (status, body) = render(StoreError::UserNotFound(UserId::new(9)).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "User with id 9 not found.");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_is_masked() {
        let (status, body) = render(StoreError::IdsExhausted("user").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Internal server error.");
    }
}
