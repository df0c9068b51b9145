//! Error types for the cartoonize pipeline and its HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Errors raised while turning an upload into a cartoon.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Uploaded bytes are not a readable image.
    #[error("invalid upload: {0}")]
    InvalidUpload(#[source] image::ImageError),

    /// Local encode or logo load failure.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Upstream returned bytes that are not a readable image.
    #[error("invalid image from {service}: {source}")]
    UpstreamImage {
        service: &'static str,
        #[source]
        source: image::ImageError,
    },

    /// Upstream returned base64 that does not decode.
    #[error("invalid base64 from {service}: {source}")]
    Base64 {
        service: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// Inference endpoint answered with a non-success status.
    #[error("{service} returned {status}: {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Inference endpoint answered 2xx but without the expected field.
    #[error("{service} response is missing `{field}`")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking image task panicked or was cancelled.
    #[error("image task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// Returns true when the failure originated at an inference endpoint.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. }
                | Self::MissingField { .. }
                | Self::Base64 { .. }
                | Self::UpstreamImage { .. }
                | Self::Network(_)
        )
    }
}

/// Keeps upstream error bodies short enough for logs and responses.
pub fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 500;
    if body.len() <= LIMIT {
        return body.to_string();
    }
    let mut end = LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        if matches!(err, PipelineError::InvalidUpload(_)) {
            ApiError::BadRequest(err.to_string())
        } else if err.is_upstream() {
            ApiError::Upstream(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, "{self}");
        } else {
            tracing::debug!(%status, "{self}");
        }

        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
