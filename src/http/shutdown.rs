//! Graceful shutdown and signal handling.
//!
//! OS signals are turned into [`ShutdownEvent`]s on a channel. A single driver
//! task consumes the channel, moves the lifecycle into draining and tells the
//! server to stop accepting connections. Tests push synthetic events through a
//! [`ShutdownTrigger`] instead of raising real signals.

use std::sync::Arc;
use std::time::Duration;

use axum_server::Handle;
use tokio::sync::mpsc;

use crate::lifecycle::{Lifecycle, ShutdownEvent};

/// Buffered events; extra signals beyond this while the driver is busy are dropped
const EVENT_BUFFER: usize = 8;

/// Sending half of the shutdown event channel.
#[derive(Clone, Debug)]
pub struct ShutdownTrigger {
    sender: mpsc::Sender<ShutdownEvent>,
}

impl ShutdownTrigger {
    /// Deliver a shutdown event to the driver.
    pub fn trigger(&self, event: ShutdownEvent) {
        if let Err(e) = self.sender.try_send(event) {
            tracing::debug!(error = %e, %event, "Shutdown event not delivered");
        }
    }
}

/// Receiving half, consumed by exactly one [`drive_shutdown`] task.
#[derive(Debug)]
pub struct ShutdownEvents {
    receiver: mpsc::Receiver<ShutdownEvent>,
}

/// Create a new shutdown event channel.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownEvents) {
    let (sender, receiver) = mpsc::channel(EVENT_BUFFER);
    (ShutdownTrigger { sender }, ShutdownEvents { receiver })
}

/// Consume shutdown events until every trigger is dropped.
///
/// The first event moves the lifecycle to draining and starts a graceful
/// shutdown of the server with `grace` to finish in-flight connections.
/// Later events are ignored.
pub async fn drive_shutdown(
    lifecycle: Arc<Lifecycle>,
    mut events: ShutdownEvents,
    handle: Handle,
    grace: Duration,
) {
    while let Some(event) = events.receiver.recv().await {
        if lifecycle.begin_drain(event) {
            handle.graceful_shutdown(Some(grace));
            tracing::info!(
                grace_secs = grace.as_secs(),
                "Graceful shutdown initiated, no longer accepting new connections"
            );
        } else {
            tracing::debug!(%event, "Shutdown already in progress, ignoring signal");
        }
    }
}

/// Forward SIGTERM and SIGINT to `trigger` for the life of the process.
///
/// A listener that cannot be installed is logged and skipped; the other one
/// keeps working.
pub fn forward_os_signals(trigger: ShutdownTrigger) {
    tokio::spawn(async move {
        let interrupt = {
            let trigger = trigger.clone();
            async move {
                loop {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!(error = %e, "Failed to install SIGINT handler");
                        return;
                    }
                    trigger.trigger(ShutdownEvent::Interrupt);
                }
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    return;
                }
            };
            while sigterm.recv().await.is_some() {
                trigger.trigger(ShutdownEvent::Terminate);
            }
        };

        #[cfg(not(unix))]
        let terminate = async move {
            drop(trigger);
        };

        tokio::join!(interrupt, terminate);
    });
}
