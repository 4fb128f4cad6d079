//! Error types shared by every crate in the workspace.
//!
//! The data access layer only ever produces [`AppError::Configuration`],
//! [`AppError::ExternalService`] and [`AppError::Internal`]; the HTTP layer adds
//! the request-level variants. [`IntoResponse`] turns any of them into the
//! standard error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::response::ApiResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Required settings are missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failure reported by (or while talking to) the Supabase service.
    #[error("external service error: {message}")]
    ExternalService {
        /// Upstream HTTP status, when a reply was received.
        status: Option<u16>,
        /// Upstream error code (e.g. a PostgREST or PostgreSQL code).
        code: Option<String>,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an external service error without upstream details.
    pub fn external(message: impl Into<String>) -> Self {
        AppError::ExternalService {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Configuration(_) => (StatusCode::SERVICE_UNAVAILABLE, "CONFIGURATION_ERROR"),
            AppError::ExternalService { status, .. } => match status {
                Some(409) => (StatusCode::CONFLICT, "CONFLICT"),
                // Credentials and table names are ours, not the caller's.
                Some(401) | Some(403) | Some(404) => {
                    (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR")
                }
                Some(s) if (400..500).contains(s) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                _ => (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
            },
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::ExternalService {
            status: e.status().map(|s| s.as_u16()),
            code: None,
            message: e.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        }

        let body = match &self {
            AppError::ExternalService {
                status: upstream_status,
                code: upstream_code,
                message,
            } => ApiResponse::err_with_details(
                code,
                message.clone(),
                json!({
                    "upstream_status": upstream_status,
                    "upstream_code": upstream_code,
                }),
            ),
            AppError::Configuration(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Internal(msg) => ApiResponse::err(code, msg.clone()),
        };

        (status, Json(body)).into_response()
    }
}
