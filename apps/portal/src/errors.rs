use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::flows::FlowError;
use crate::gateway::ApiError;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    /// A newer action of the same session superseded this one.
    #[error("Superseded")]
    Stale,

    #[error("Backend error: {message}")]
    Backend { code: &'static str, message: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ApiError> for AppError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized => AppError::Unauthorized(ApiError::Unauthorized.to_string()),
            ApiError::AuthRequired => AppError::Unauthorized("Authentication required".into()),
            ApiError::Stale => AppError::Stale,
            ApiError::Api { status: 404, message } => AppError::NotFound(message),
            ApiError::Api { status, message } if (400..500).contains(&status) => {
                AppError::UnprocessableEntity(message)
            }
            other => AppError::Backend {
                code: other.code(),
                message: other.to_string(),
            },
        }
    }
}

impl From<FlowError> for AppError {
    fn from(error: FlowError) -> Self {
        match error {
            FlowError::Validation(msg) => AppError::Validation(msg),
            FlowError::Rejected(msg) => AppError::UnprocessableEntity(msg),
            FlowError::NotFound(msg) => AppError::NotFound(msg),
            FlowError::LoginRequired => AppError::Unauthorized(FlowError::LoginRequired.to_string()),
            FlowError::Forbidden => AppError::Forbidden,
            FlowError::Api(e) => e.into(),
            FlowError::Session(SessionError::Stale) => AppError::Stale,
            FlowError::Session(e) => AppError::Backend {
                code: "SESSION_ERROR",
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Stale => (
                StatusCode::CONFLICT,
                "STALE",
                "Superseded by a newer action".to_string(),
            ),
            AppError::Backend { code, message } => {
                tracing::error!("Backend error: {message}");
                (StatusCode::BAD_GATEWAY, *code, message.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
