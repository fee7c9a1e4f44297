//! Errors surfaced to HTTP clients.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::io;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Every failure a handler can return. Server-side variants carry the raw
/// underlying message, which is sent back as the response body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("An error occurred during cleanup: {0}")]
    Cleanup(#[source] io::Error),

    #[error("An error occurred during directory creation: {0}")]
    CreateDir(#[source] io::Error),

    #[error("Missing required files")]
    MissingFiles,

    #[error("Missing required form data")]
    MissingFormData,

    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("An error occurred while saving files: {0}")]
    Save(#[source] io::Error),

    #[error("An error occurred while unpacking clips folder: {0}")]
    Unpack(#[from] zip::result::ZipError),

    #[error("An error occurred while reading output: {0}")]
    Read(#[source] io::Error),

    #[error("Not Found")]
    NotFound,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFiles
            | AppError::MissingFormData
            | AppError::InvalidFileName(_)
            | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Cleanup(_)
            | AppError::CreateDir(_)
            | AppError::Save(_)
            | AppError::Unpack(_)
            | AppError::Read(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}
