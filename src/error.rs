//! Error taxonomy for the user-resource API.
//!
//! Inner components raise their own typed failures (e.g. `AuthzError`);
//! the handler layer converts each exactly once into an `ApiError`, which
//! owns the mapping to an HTTP status and response body. Nothing below the
//! handler boundary writes HTTP responses. Enrichment failures never reach
//! this taxonomy: a read does not fail because the external profile source
//! is unavailable.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

/// Request-terminating failures, one variant per HTTP outcome class.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Missing or malformed required input (400). No store access happens
    /// after this is raised.
    Validation(String),

    /// Requester or target record does not exist (404).
    NotFound(String),

    /// Token unresolvable or authentication missing (401, with body).
    Unauthorized(String),

    /// Authenticated but not permitted to touch the target (401, empty body).
    PermissionDenied,

    /// Store or dependency failure (500). Never retried.
    Upstream(String),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) | Self::PermissionDenied => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::PermissionDenied => write!(f, "Permission denied"),
            Self::Upstream(msg) => write!(f, "Upstream failure: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            // Permission denials are sent with an empty body.
            Self::PermissionDenied => status.into_response(),
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Upstream(msg) => {
                let body = serde_json::json!({
                    "status": status.as_u16(),
                    "msg": msg,
                });
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::PermissionDenied.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Upstream("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display() {
        let err = ApiError::NotFound("User not found.".into());
        assert_eq!(err.to_string(), "Not found: User not found.");
    }

    #[tokio::test]
    async fn test_body_shape() {
        let resp = ApiError::Validation("Please provide user ID.".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], 400);
        assert_eq!(body["msg"], "Please provide user ID.");
    }

    #[tokio::test]
    async fn test_permission_denied_empty_body() {
        let resp = ApiError::PermissionDenied.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }
}
