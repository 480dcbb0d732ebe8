//! Landing page handler.

use axum::{extract::State, response::Html};
use tracing::instrument;

use crate::config::APP_NAME;
use crate::error::{ErrorResponse, ResultExt};
use crate::state::AppState;
use crate::templates::INDEX_TEMPLATE;

/// Landing page showing environment, version, port and uptime.
#[instrument(name = "home::index", skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ErrorResponse> {
    let config = &state.config;

    let mut context = tera::Context::new();
    context.insert("app_name", APP_NAME);
    context.insert("environment", &config.environment);
    context.insert("version", &config.version);
    context.insert("port", &config.port);
    context.insert("uptime", &state.lifecycle.uptime().as_secs_f64());

    let html = state
        .tera
        .render(INDEX_TEMPLATE, &context)
        .for_environment(config)?;
    Ok(Html(html))
}
