//! API error types with IntoResponse
//!
//! Every failure is rendered as `{"error": <text>}` with the matching status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::models::{Entity, ValidationError};

pub const CONNECTION_ERROR: &str = "Error de conexión con la BD";
pub const MISSING_FIELDS: &str = "Faltan campos requeridos";
pub const INVALID_FORMAT: &str = "Formato de datos inválido";
pub const REDACTED_STORAGE_ERROR: &str = "Error interno de la BD";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Storage could not be reached; no query was attempted (500)
    ConnectionUnavailable,

    /// Missing fields or bad coercion (400)
    Validation(ValidationError),

    /// No record with the requested identifier (404)
    NotFound { message: &'static str },

    /// Query or commit failed (500)
    Storage { message: String },
}

impl ApiError {
    pub fn not_found<E: Entity>() -> Self {
        Self::NotFound {
            message: E::MESSAGES.not_found,
        }
    }

    /// Log the failure and keep its text unless redaction is on.
    pub fn storage(e: DbError, redact: bool) -> Self {
        tracing::error!(error = %e, "storage error");
        let message = if redact {
            REDACTED_STORAGE_ERROR.to_string()
        } else {
            e.to_string()
        };
        Self::Storage { message }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::ConnectionUnavailable | Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::ConnectionUnavailable => CONNECTION_ERROR,
            Self::Validation(ValidationError::MissingFields { .. }) => MISSING_FIELDS,
            Self::Validation(_) => INVALID_FORMAT,
            Self::NotFound { message } => *message,
            Self::Storage { message } => message.as_str(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Validation(e) = &self {
            tracing::debug!(reason = %e, "rejected payload");
        }

        let body = Json(json!({ "error": self.message() }));
        (self.status(), body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}
