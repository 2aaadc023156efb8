use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Required configuration is absent; raised before any network call.
    #[error("{0}")]
    Configuration(String),

    /// The image provider answered with a non-success status.
    #[error("HF API error {status}: {message}")]
    Provider { status: u16, message: String },

    /// The client sent an incomplete or malformed request.
    #[error("{0}")]
    Validation(String),

    #[error("HF API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_)
            | AppError::Provider { .. }
            | AppError::Transport(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn log(&self) {
        match self {
            AppError::Validation(_) => tracing::warn!("Rejected request: {}", self),
            _ => tracing::error!("Request failed: {}", self),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
