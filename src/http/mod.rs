//! HTTP server module.
//!
//! The server includes:
//! - Plain HTTP listener on the configured host and port
//! - Graceful shutdown on SIGTERM/SIGINT with connection draining
//! - A forced exit once the drain outlives its grace period
//! - Static file serving with a not-found fallback

mod server;
pub mod shutdown;
pub mod static_files;

pub use server::{start_server, ServerError};
