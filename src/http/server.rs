//! HTTP server startup logic.
//!
//! Binds the listen address, wires the shutdown driver to the server handle and
//! runs until the server has drained. If draining outlives the grace period by
//! more than [`FORCE_EXIT_MARGIN`], the server future is dropped so the process
//! can exit anyway.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;

use crate::config::{ConfigError, ServerConfig, FORCE_EXIT_MARGIN};
use crate::lifecycle::Lifecycle;

use super::shutdown::{self, ShutdownEvents};

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    Address(#[from] ConfigError),

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the HTTP server until it has shut down.
///
/// `events` is handed to the shutdown driver; the lifecycle is marked
/// terminated once the server stops.
pub async fn start_server(
    app: Router,
    config: &ServerConfig,
    lifecycle: Arc<Lifecycle>,
    events: ShutdownEvents,
) -> Result<(), ServerError> {
    let addr = config.listen_addr().await?;
    let handle = Handle::new();
    let grace = config.shutdown_grace;

    tokio::spawn(shutdown::drive_shutdown(
        Arc::clone(&lifecycle),
        events,
        handle.clone(),
        grace,
    ));
    tokio::spawn(announce_listening(handle.clone()));

    let server = axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service());

    run_until_drained(server, &lifecycle, grace + FORCE_EXIT_MARGIN).await
}

/// Await `server`, giving up on it `deadline` after draining has begun.
async fn run_until_drained<F>(
    server: F,
    lifecycle: &Lifecycle,
    deadline: Duration,
) -> Result<(), ServerError>
where
    F: Future<Output = std::io::Result<()>>,
{
    let watchdog = async {
        lifecycle.wait_for_drain().await;
        tokio::time::sleep(deadline).await;
    };

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server failed");
                lifecycle.mark_terminated();
                return Err(ServerError::Serve(e));
            }
        }
        _ = watchdog => {
            tracing::warn!(
                deadline_secs = deadline.as_secs(),
                "Connections did not drain in time, forcing exit"
            );
        }
    }

    lifecycle.mark_terminated();
    Ok(())
}

/// Log the bound address and check URLs once the socket is listening.
async fn announce_listening(handle: Handle) {
    let Some(addr) = handle.listening().await else {
        return;
    };
    log_endpoints(addr);
}

fn log_endpoints(addr: SocketAddr) {
    tracing::info!(%addr, "Server running on http://{}", addr);
    tracing::info!("Health check available at http://{}/health", addr);
    tracing::info!("Readiness check at http://{}/ready", addr);
}
