//! Responses for unmatched routes and panicking handlers.

use std::any::Any;

use axum::{
    extract::OriginalUri,
    response::{IntoResponse, Response},
};

use crate::error::ErrorResponse;

/// Default handler when no route, method or static file matches.
///
/// Echoes the request target, including any query string, in the message.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ErrorResponse {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    tracing::debug!(path = %target, "No route matched");
    ErrorResponse::not_found(target)
}

/// Convert a caught handler panic into a normalized 500 response.
pub fn handler_panicked(panic: Box<dyn Any + Send + 'static>, expose_detail: bool) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    ErrorResponse::internal(&detail, expose_detail).into_response()
}
