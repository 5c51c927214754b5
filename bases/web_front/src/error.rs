//! HTTP-facing errors
//!
//! Every failure is answered with `{"success": false, "error": <message>}`.
//! The status code depends on the variant, and handlers pick the variant
//! explicitly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use media_downloader::DownloadError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unusable input
    #[error("{0}")]
    Validation(String),

    /// Request body above the configured ceiling
    #[error("{0}")]
    TooLarge(String),

    /// The download endpoint could not produce a file
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// A file asked for by name could not be opened
    #[error("File not found: {name}")]
    MissingFile {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render page: {0}")]
    Template(String),
}

impl ApiError {
    pub fn missing_file(name: impl Into<String>, source: std::io::Error) -> Self {
        ApiError::MissingFile {
            name: name.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Download(_) => StatusCode::BAD_REQUEST,
            ApiError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MissingFile { .. } | ApiError::Io(_) | ApiError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Body of every unsuccessful response
#[derive(Debug, Serialize)]
pub struct Failure {
    success: bool,
    error: String,
}

impl Failure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::warn!("request rejected: {}", self);
        }

        (status, Json(Failure::new(self.to_string()))).into_response()
    }
}
