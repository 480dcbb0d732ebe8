//! Error types and the normalized JSON error response.
//!
//! Handlers return [`AppError`]; before it leaves the handler it is turned into
//! an [`ErrorResponse`] for the running environment with
//! [`ResultExt::for_environment`]. Internal error detail is only exposed
//! outside production.

use axum::{
    http::{header::CACHE_CONTROL, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::{ServerConfig, CACHE_CONTROL_NO_STORE, REDACTED_ERROR_MESSAGE};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Class of a normalized error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InternalError,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the `error` field on the wire.
    pub fn title(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "Not Found",
            ErrorKind::InternalError => "Something went wrong!",
        }
    }
}

/// Normalized error payload, serialized as `{"error": ..., "message": ...}`.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: &'a str,
}

impl ErrorResponse {
    /// Response for a request target that matched no route.
    pub fn not_found(target: &str) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: format!("Route {} not found", target),
        }
    }

    /// Response for a failed handler.
    ///
    /// `detail` is always logged; it is only returned to the client when
    /// `expose_detail` is set.
    pub fn internal(detail: &str, expose_detail: bool) -> Self {
        tracing::error!(error = %detail, "Request handler failed");
        let message = if expose_detail {
            detail.to_string()
        } else {
            REDACTED_ERROR_MESSAGE.to_string()
        };
        Self {
            kind: ErrorKind::InternalError,
            message,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.kind.title(),
            message: &self.message,
        });
        let mut response = (self.kind.status(), body).into_response();
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_NO_STORE));
        response
    }
}

/// Converts handler results into environment-aware error responses.
pub trait ResultExt<T> {
    fn for_environment(self, config: &ServerConfig) -> Result<T, ErrorResponse>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn for_environment(self, config: &ServerConfig) -> Result<T, ErrorResponse> {
        self.map_err(|e| {
            let error: AppError = e.into();
            ErrorResponse::internal(&error.to_string(), !config.is_production())
        })
    }
}
