use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::store::StorageError;

/// One violated field from payload validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Inbound event failed shape validation; carries every violated field
    #[error("validation failed: {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    /// Malformed query parameter or request body
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Missing or invalid API key
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Backing store unavailable or read/write failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AppError {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::Unauthorized(_) => "unauthorized",
            Self::Storage(_) => "storage_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Failed".to_string()),
            Self::InvalidParameter(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Storage(err) => {
                // Opaque to the client; the cause goes to the log only
                tracing::error!(error = %err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage failure".to_string(),
                )
            }
        };

        let mut error = json!({
            "message": message,
            "type": self.type_name(),
        });

        if let Self::Validation(fields) = &self {
            error["details"] = json!(fields);
        }

        let body = Json(json!({ "error": error }));

        (status, body).into_response()
    }
}
