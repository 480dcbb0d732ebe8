//! Shared application state for request handlers.

use std::sync::Arc;
use tera::Tera;

use crate::config::ServerConfig;
use crate::lifecycle::Lifecycle;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Holds the resolved configuration snapshot, the Tera template engine, and
/// the process lifecycle used by the health and readiness checks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub tera: Arc<Tera>,
    pub lifecycle: Arc<Lifecycle>,
}

impl AppState {
    /// Creates a new application state from the given configuration, templates, and lifecycle.
    pub fn new(config: ServerConfig, tera: Tera, lifecycle: Arc<Lifecycle>) -> Self {
        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
            lifecycle,
        }
    }
}
