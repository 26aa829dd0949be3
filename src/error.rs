//! Application error type and its HTTP representation.
//!
//! Every error response shares one envelope:
//!
//! ```json
//! { "message": "domain query param is required", "data": [] }
//! ```
//!
//! Details are logged, never echoed to the caller.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    data: Vec<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The caller sent unusable input.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The upstream provider produced no usable metrics.
    #[error("{message}")]
    Upstream { message: String, details: Value },

    /// Store failures and anything else unexpected.
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn upstream(message: impl Into<String>, details: Value) -> Self {
        Self::Upstream {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            AppError::Validation { message, .. } | AppError::Upstream { message, .. } => message,
            AppError::Internal { message, details } => {
                tracing::error!(%message, %details, "Internal error");
                "Internal Server Error".to_string()
            }
        };

        let body = ErrorBody {
            message,
            data: Vec::new(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::internal("Database error", serde_json::json!({ "reason": e.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AppError::bad_request("domain query param is required", json!({}));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_and_internal_map_to_500() {
        let upstream = AppError::upstream("Failed to fetch from RapidAPI", json!({}));
        let internal = AppError::internal("Database error", json!({}));

        assert_eq!(upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ErrorBody {
            message: "domain query param is required".to_string(),
            data: Vec::new(),
        })
        .unwrap();

        assert_eq!(body["message"], "domain query param is required");
        assert_eq!(body["data"], json!([]));
    }

    #[test]
    fn test_sqlx_error_becomes_internal() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
