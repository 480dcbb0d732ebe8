//! k8s-web-app: a status web service for container orchestrators.
//!
//! This is the application entry point. It starts the uptime clock, initializes
//! tracing, resolves configuration from the environment, loads templates, sets
//! up the Axum router and runs the HTTP server until a shutdown signal has been
//! handled.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use k8s_web_app::config::{DEFAULT_LOG_FILTER, DEFAULT_LOG_FORMAT, ENV_LOG_FORMAT};
use k8s_web_app::http::{self, shutdown};
use k8s_web_app::templates::init_templates;
use k8s_web_app::{create_router, AppState, Lifecycle, ServerConfig};

/// k8s-web-app: a status web service for container orchestrators
#[derive(Parser, Debug)]
#[command(name = "k8s-web-app", version, about)]
struct Args {
    /// Log level filter (e.g., "k8s_web_app=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log format: "text" or "json"
    #[arg(long, env = ENV_LOG_FORMAT, default_value = DEFAULT_LOG_FORMAT)]
    log_format: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Uptime is measured from here
    let lifecycle = Arc::new(Lifecycle::new());

    let args = Args::parse();

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if args.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let config = ServerConfig::resolve()?;
    tracing::info!(
        environment = %config.environment,
        version = %config.version,
        pod = %config.pod_name,
        namespace = %config.namespace,
        production = config.is_production(),
        "Loaded configuration"
    );

    let tera = init_templates(&config.template_glob())?;
    tracing::info!(dir = %config.template_dir, "Initialized templates");

    let state = AppState::new(config.clone(), tera, Arc::clone(&lifecycle));
    let app = create_router(state);

    let (trigger, events) = shutdown::shutdown_channel();
    shutdown::forward_os_signals(trigger);

    http::start_server(app, &config, lifecycle, events).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
