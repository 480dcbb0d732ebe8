//! Static file serving with a not-found fallback.
//!
//! Files under the configured static directory are served for GET and HEAD
//! requests with a long-lived `Cache-Control`. Anything else, including other
//! methods, is handed to the fallback service.

use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeader;

use crate::config::CACHE_CONTROL_STATIC;

/// Create the static file service for `dir`, delegating misses to `fallback`.
///
/// The cache header is only added when the response does not already carry
/// one, so fallback responses keep their own caching policy.
pub fn create_static_service<F>(dir: &str, fallback: F) -> SetResponseHeader<ServeDir<F>, HeaderValue> {
    let serve_dir = ServeDir::new(dir)
        .append_index_html_on_directories(false)
        .call_fallback_on_method_not_allowed(true)
        .fallback(fallback);

    SetResponseHeader::if_not_present(
        serve_dir,
        CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL_STATIC),
    )
}
