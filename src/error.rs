//! Error types for the conversion server

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::pdf::EngineError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
///
/// Client input problems carry their message back to the caller. Codec,
/// workspace and internal failures are logged and answered with a generic
/// message; document engine failures append the engine's message.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Input(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Decode(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("{context}: {message}")]
    Transform {
        context: &'static str,
        message: String,
    },

    #[error("Workspace error: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("{context}: {source}")]
    Library {
        context: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn input(message: impl Into<String>) -> Self {
        AppError::Input(message.into())
    }

    pub fn transform(context: &'static str, err: impl std::fmt::Display) -> Self {
        AppError::Transform {
            context,
            message: err.to_string(),
        }
    }

    pub fn library(context: &'static str, source: EngineError) -> Self {
        AppError::Library { context, source }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Input(_) | AppError::Decode(_) | AppError::UnsupportedFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Transform { .. }
            | AppError::Workspace(_)
            | AppError::Library { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Input(msg) | AppError::Decode(msg) => {
                tracing::debug!("Rejected request: {}", msg);
                msg.clone()
            }
            AppError::PayloadTooLarge(_) | AppError::UnsupportedFormat(_) => {
                tracing::debug!("Rejected request: {}", self);
                self.to_string()
            }
            AppError::Transform { context, message } => {
                tracing::error!("Transform error: {}: {}", context, message);
                context.to_string()
            }
            AppError::Workspace(e) => {
                tracing::error!("Workspace error: {}", e);
                "Error handling temporary files".to_string()
            }
            AppError::Library { .. } => {
                tracing::error!("Document engine error: {}", self);
                self.to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}
