//! Error handling and custom error types
//!
//! Provides unified error handling across the service using thiserror. Every
//! variant maps to an HTTP status and renders as the `{ error: { message } }`
//! envelope the web client expects.

use crate::models::ErrorEnvelope;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by the inference provider.
    #[error("{message}")]
    Provider { status: u16, message: String },

    /// The model answered, but its content was not valid JSON.
    #[error("{0}")]
    InvalidModelOutput(serde_json::Error),

    #[error("Server API key not configured.")]
    NotConfigured,

    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request body too large.")]
    PayloadTooLarge,

    #[error("Not found")]
    NotFound,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status reported to the caller for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Error::Provider { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Error::Io(_)
            | Error::Serialization(_)
            | Error::Http(_)
            | Error::InvalidModelOutput(_)
            | Error::Config(_)
            | Error::Generic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", message);
        } else {
            tracing::warn!(status = status.as_u16(), "Request rejected: {}", message);
        }

        let mut response = (status, Json(ErrorEnvelope::new(message))).into_response();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        response
    }
}
