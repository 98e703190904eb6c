//! Error types for the image server
//!
//! Provides unified error handling using thiserror. Every failure in the
//! request pipeline is one of these variants, and the HTTP boundary is the
//! only place that decides which status a variant maps to.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Image Server Error Enum ==
/// Unified error type for the image server.
#[derive(Error, Debug)]
pub enum ImageServerError {
    /// Request path does not match the request grammar
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Source path does not resolve to a readable image
    #[error("Image not found: {0}")]
    ImageNotFound(String),

    /// Requested size is not allowed or cannot be resolved
    #[error("Invalid size: {0}")]
    InvalidSize(String),

    /// Requested quality is not allowed
    #[error("Invalid quality: {0}")]
    InvalidQuality(String),

    /// Decoding, resampling or encoding failed
    #[error("Engine error: {0}")]
    Engine(String),

    /// Cache directory or artifact I/O failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ImageServerError {
    /// Stable name of the error kind, as exposed to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            ImageServerError::InvalidUrl(_) => "InvalidURL",
            ImageServerError::ImageNotFound(_) => "ImageNotFound",
            ImageServerError::InvalidSize(_) => "InvalidSize",
            ImageServerError::InvalidQuality(_) => "InvalidQuality",
            ImageServerError::Engine(_) => "EngineFailure",
            ImageServerError::Storage(_) => "StorageFailure",
        }
    }

    /// HTTP status this error is surfaced with.
    pub fn status(&self) -> StatusCode {
        match self {
            ImageServerError::InvalidUrl(_)
            | ImageServerError::InvalidSize(_)
            | ImageServerError::InvalidQuality(_) => StatusCode::BAD_REQUEST,
            ImageServerError::ImageNotFound(_) => StatusCode::NOT_FOUND,
            ImageServerError::Engine(_) | ImageServerError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ImageServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse::new(self.kind(), self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the image server.
pub type Result<T> = std::result::Result<T, ImageServerError>;
