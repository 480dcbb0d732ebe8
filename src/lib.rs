//! k8s-web-app - a small status web service for container orchestrators.
//!
//! Serves liveness and readiness checks, a build information endpoint and a
//! landing page, and shuts down gracefully on SIGTERM/SIGINT.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod templates;

pub use config::{ConfigError, ServerConfig};
pub use error::{AppError, ErrorResponse};
pub use lifecycle::{Lifecycle, Phase, ShutdownEvent};
pub use routes::create_router;
pub use state::AppState;
