//! Error handling for the HTTP layer
//!
//! Every handler returns `Result<_, AppError>`; the single `IntoResponse`
//! implementation below shapes all failures into [`ErrorBody`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Uniform error response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    pub timestamp: String,
    /// Status rendered as `"<code> <REASON>"`, e.g. `"404 NOT_FOUND"`
    pub error_code: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("validation failed: {}", details.join(", "))]
    Validation { details: Vec<String> },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a validation error from individual violation descriptions
    pub fn validation<I, S>(details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Validation {
            details: details.into_iter().map(Into::into).collect(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message with its category prefix
    pub fn client_message(&self) -> String {
        match self {
            AppError::NotFound { message } => format!("Entity not found: {message}"),
            AppError::Validation { details } => {
                format!("Validation failed: {}", details.join(", "))
            }
            // Top-level message only; the cause chain stays in the logs.
            AppError::Internal(e) => format!("Internal server error: {e}"),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.client_message(),
            timestamp: now_timestamp(),
            error_code: status_label(self.status()),
        }
    }
}

/// `404 NOT_FOUND`, `400 BAD_REQUEST`, `500 INTERNAL_SERVER_ERROR`, ...
pub fn status_label(status: StatusCode) -> String {
    let reason = status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_uppercase()
        .replace([' ', '-'], "_");
    format!("{} {}", status.as_u16(), reason)
}

fn now_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339).unwrap_or_else(|_| now.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.to_body();

        match &self {
            AppError::Internal(e) => tracing::error!(
                error_code = %body.error_code,
                status_code = %status.as_u16(),
                error = %format_args!("{:#}", e),
                "Request error"
            ),
            _ => tracing::warn!(
                error_code = %body.error_code,
                status_code = %status.as_u16(),
                message = %body.message,
                "Request rejected"
            ),
        }

        (status, Json(body)).into_response()
    }
}
