use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::calendar_source::SourceError;
use crate::domain::validation::ValidationError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Error type shared by every layer of the service.
///
/// Request validation failures map to 400, unknown short codes to 404,
/// calendar source failures to 502 and store failures to 503.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    SourceUnavailable { message: String, details: Value },

    #[error("{message}")]
    StoreUnavailable { message: String, details: Value },
}

impl AppError {
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn source_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
            details,
        }
    }

    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::SourceUnavailable { .. } => StatusCode::BAD_GATEWAY,
            Self::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            Self::Validation(err) => ErrorInfo {
                code: "validation_error",
                message: err.to_string(),
                details: err.details(),
            },
            Self::NotFound { message, details } => ErrorInfo {
                code: "not_found",
                message: message.clone(),
                details: details.clone(),
            },
            Self::SourceUnavailable { message, details } => ErrorInfo {
                code: "source_unavailable",
                message: message.clone(),
                details: details.clone(),
            },
            Self::StoreUnavailable { message, details } => ErrorInfo {
                code: "store_unavailable",
                message: message.clone(),
                details: details.clone(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let info = self.to_error_info();

        if status.is_server_error() {
            tracing::error!(code = info.code, details = %info.details, "{}", info.message);
        } else {
            tracing::debug!(code = info.code, details = %info.details, "{}", info.message);
        }

        (status, Json(ErrorBody { error: info })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::store_unavailable("Database error", json!({ "reason": e.to_string() }))
    }
}

impl From<SourceError> for AppError {
    fn from(e: SourceError) -> Self {
        AppError::source_unavailable(
            "Calendar source unavailable",
            json!({ "reason": e.to_string() }),
        )
    }
}
