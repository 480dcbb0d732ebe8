//! Process lifecycle: uptime, health, readiness and the shutdown state machine.
//!
//! The lifecycle moves through `Running -> Draining -> Terminated` exactly once.
//! Transitions go through [`Lifecycle::begin_drain`] and
//! [`Lifecycle::mark_terminated`]; the phase is held in a `watch` channel so the
//! sender's lock serializes racing transitions and other tasks can await a
//! phase change.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

/// Current phase of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Running,
    Draining,
    Terminated,
}

/// External request to shut the process down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownEvent {
    /// SIGTERM, as sent by the orchestrator
    Terminate,
    /// SIGINT / Ctrl+C
    Interrupt,
}

impl fmt::Display for ShutdownEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownEvent::Terminate => f.write_str("SIGTERM"),
            ShutdownEvent::Interrupt => f.write_str("SIGINT"),
        }
    }
}

/// Liveness report, built fresh for every request.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since process start
    pub uptime: f64,
    pub environment: String,
    pub version: String,
}

/// Readiness report, built fresh for every request.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub status: &'static str,
    pub timestamp: String,
}

impl ReadinessReport {
    pub fn is_ready(&self) -> bool {
        self.status == STATUS_READY
    }
}

pub const STATUS_HEALTHY: &str = "healthy";
pub const STATUS_READY: &str = "ready";
pub const STATUS_NOT_READY: &str = "not_ready";

/// Current wall-clock time as an RFC 3339 UTC string with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Owned process lifecycle state.
#[derive(Debug)]
pub struct Lifecycle {
    started: Instant,
    phase: watch::Sender<Phase>,
}

impl Lifecycle {
    /// Start the uptime clock in the `Running` phase.
    pub fn new() -> Self {
        let (phase, _) = watch::channel(Phase::Running);
        Self {
            started: Instant::now(),
            phase,
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Monotonic time since the lifecycle was created.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Liveness is reported as healthy in every phase.
    pub fn health(&self, environment: &str, version: &str) -> HealthReport {
        HealthReport {
            status: STATUS_HEALTHY,
            timestamp: timestamp(),
            uptime: self.uptime().as_secs_f64(),
            environment: environment.to_string(),
            version: version.to_string(),
        }
    }

    /// Ready while running; not ready once draining has begun.
    pub fn readiness(&self) -> ReadinessReport {
        let status = match self.phase() {
            Phase::Running => STATUS_READY,
            Phase::Draining | Phase::Terminated => STATUS_NOT_READY,
        };
        ReadinessReport {
            status,
            timestamp: timestamp(),
        }
    }

    /// Move from `Running` to `Draining`.
    ///
    /// Returns `true` only for the caller that performed the transition; any
    /// later or concurrent call is a no-op returning `false`.
    pub fn begin_drain(&self, event: ShutdownEvent) -> bool {
        let transitioned = self.phase.send_if_modified(|phase| {
            if *phase == Phase::Running {
                *phase = Phase::Draining;
                true
            } else {
                false
            }
        });

        if transitioned {
            info!(signal = %event, "{} received, shutting down gracefully", event);
        }
        transitioned
    }

    /// Move from `Draining` to `Terminated`. Returns `true` if this call did it.
    ///
    /// Also accepted straight from `Running`, for a server that stopped on its own.
    pub fn mark_terminated(&self) -> bool {
        let transitioned = self.phase.send_if_modified(|phase| {
            if *phase == Phase::Terminated {
                false
            } else {
                *phase = Phase::Terminated;
                true
            }
        });

        if transitioned {
            info!(
                uptime_secs = self.uptime().as_secs(),
                "Server stopped, process terminating"
            );
        }
        transitioned
    }

    /// Resolves once the lifecycle has left `Running`.
    pub async fn wait_for_drain(&self) {
        let mut rx = self.phase.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|phase| *phase != Phase::Running).await;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
