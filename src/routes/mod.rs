//! HTTP route table and dispatch.
//!
//! The route table is fixed at startup. Requests that match no route fall
//! through to the static file service and then to the not-found handler; a
//! known path with an unregistered method is also answered with not-found.
//! Handler panics are caught and turned into normalized 500 responses.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod fallback;
pub mod health;
pub mod home;
pub mod info;

use std::any::Any;

use axum::{
    handler::HandlerWithoutStateExt,
    http::{header::CACHE_CONTROL, HeaderName, HeaderValue},
    middleware,
    routing::get,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_NO_STORE, SECURITY_HEADERS};
use crate::http::static_files::create_static_service;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// The application's route table, without fallbacks or middleware.
pub fn routes() -> Router<AppState> {
    // Health checks are never cached
    let check_routes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ));

    let page_routes = Router::new().route("/", get(home::index));

    let api_routes = Router::new().route("/api/info", get(info::info));

    Router::new()
        .merge(check_routes)
        .merge(page_routes)
        .merge(api_routes)
}

/// Creates the Axum router with all routes, fallbacks and middleware.
pub fn create_router(state: AppState) -> Router {
    build_app(routes(), state)
}

/// Wrap a route table with the not-found fallbacks, panic handling, security
/// headers, CORS and request logging.
pub fn build_app(routes: Router<AppState>, state: AppState) -> Router {
    let expose_detail = !state.config.is_production();
    let static_service =
        create_static_service(&state.config.static_dir, fallback::not_found.into_service());

    let mut app = routes
        .method_not_allowed_fallback(fallback::not_found)
        .fallback_service(static_service)
        .with_state(state)
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            fallback::handler_panicked(panic, expose_detail)
        }));

    for &(name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    app.layer(CorsLayer::permissive())
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
