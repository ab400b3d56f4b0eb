//! HTTP error handling: maps domain errors onto status codes and a stable
//! JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::db::repository::error::RepositoryError;
use crate::services::import::ImportError;
use crate::services::statistics::StatisticsError;

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Stable machine-readable code, e.g. "INVALID_PERIOD".
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application-level error, convertible from every layer below.
#[derive(Debug)]
pub enum AppError {
    /// Malformed request input (bad vehicle number, unparseable date).
    InvalidInput(String),
    /// A structurally valid but unacceptable period selection.
    InvalidPeriod(String),
    /// Missing or invalid credentials.
    Unauthorized(String),
    /// Valid credentials, insufficient rights.
    Forbidden(String),
    /// The requested resource does not exist.
    NotFound(String),
    /// Request conflicts with current state (duplicate id, taken vehicle).
    Conflict(String),
    /// Statistics could not be computed because storage was unreachable.
    StatisticsUnavailable(String),
    /// Anything unexpected.
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InvalidInput(message) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_INPUT", message),
            ),
            AppError::InvalidPeriod(message) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_PERIOD", message),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("UNAUTHORIZED", message),
            ),
            AppError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", message))
            }
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
            }
            AppError::Conflict(message) => {
                (StatusCode::CONFLICT, ApiError::new("CONFLICT", message))
            }
            AppError::StatisticsUnavailable(details) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::new(
                    "STATISTICS_UNAVAILABLE",
                    "statistics are temporarily unavailable; try again shortly",
                )
                .with_details(details),
            ),
            AppError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", message),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<StatisticsError> for AppError {
    fn from(err: StatisticsError) -> Self {
        match err {
            StatisticsError::InvalidInput(message) => AppError::InvalidInput(message),
            StatisticsError::InvalidPeriod(message) => AppError::InvalidPeriod(message),
            StatisticsError::Unavailable { .. } => {
                AppError::StatisticsUnavailable(err.to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::Forbidden(message) => AppError::Forbidden(message),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match &err {
            RepositoryError::NotFound { message, .. } => AppError::NotFound(message.clone()),
            RepositoryError::ValidationError { message, .. } => AppError::Conflict(message.clone()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::EmptyLog | ImportError::MissingColumn(_) | ImportError::Csv(_) => {
                AppError::InvalidInput(err.to_string())
            }
            ImportError::Repository(repo_err) => repo_err.into(),
        }
    }
}
