//! Configuration loading and constants.
//!
//! Resolves the process-wide [`ServerConfig`] from environment variables once at
//! startup and defines the defaults, variable names, header values and logging
//! settings used across the service. Every value is optional; absent or empty
//! variables fall back to the documented default.

use std::net::SocketAddr;
use std::time::Duration;

use const_format::formatcp;

// =============================================================================
// Environment Variable Names
// =============================================================================

pub const ENV_PORT: &str = "PORT";
pub const ENV_HOST: &str = "HOST";
pub const ENV_ENVIRONMENT: &str = "APP_ENV";
/// Read when `APP_ENV` is unset, for deployments configured with the Node convention
pub const ENV_ENVIRONMENT_FALLBACK: &str = "NODE_ENV";
pub const ENV_VERSION: &str = "APP_VERSION";
/// Kubernetes sets the container hostname to the pod name
pub const ENV_POD_NAME: &str = "HOSTNAME";
pub const ENV_NAMESPACE: &str = "NAMESPACE";
pub const ENV_SHUTDOWN_GRACE: &str = "SHUTDOWN_GRACE_SECONDS";
pub const ENV_TEMPLATE_DIR: &str = "TEMPLATE_DIR";
pub const ENV_STATIC_DIR: &str = "STATIC_DIR";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_POD_NAME: &str = "unknown";
pub const DEFAULT_NAMESPACE: &str = "default";

/// Seconds in-flight connections get to finish once draining starts
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

/// Extra time past the grace period before the process stops waiting on the server
pub const FORCE_EXIT_MARGIN: Duration = Duration::from_secs(5);

pub const DEFAULT_TEMPLATE_DIR: &str = "templates";
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Environment names treated as production (compared case-insensitively)
pub const PRODUCTION_ENVIRONMENTS: &[&str] = &["production", "prod"];

// =============================================================================
// Response Constants
// =============================================================================

pub const APP_NAME: &str = "K8s Web App";
pub const INFO_MESSAGE: &str = formatcp!("Welcome to {} API", APP_NAME);

/// Message returned in place of error detail in production
pub const REDACTED_ERROR_MESSAGE: &str = "Internal server error";

/// Static assets are cached for a day
pub const HTTP_CACHE_STATIC_MAX_AGE: u32 = 86400;

pub const CACHE_CONTROL_STATIC: &str = formatcp!("public, max-age={}", HTTP_CACHE_STATIC_MAX_AGE);

/// Health check and error responses must never be served from a cache
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Security headers added to every response that does not set them itself
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self'; style-src 'self' 'unsafe-inline'; object-src 'none'; base-uri 'self'; frame-ancestors 'self'",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    // Disables the legacy browser XSS auditor
    ("x-xss-protection", "0"),
];

// =============================================================================
// Logging
// =============================================================================

/// Default log filter when neither the CLI flag nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "k8s_web_app=debug,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Immutable process configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deployment environment name (e.g. "development", "production")
    pub environment: String,
    pub version: String,
    pub pod_name: String,
    pub namespace: String,
    pub shutdown_grace: Duration,
    pub template_dir: String,
    pub static_dir: String,
}

impl ServerConfig {
    /// Resolve configuration from the process environment.
    pub fn resolve() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup`, treating empty values as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let read_or = |key: &str, default: &str| read(key).unwrap_or_else(|| default.to_string());

        let port = match read(ENV_PORT) {
            Some(raw) => parse_number(ENV_PORT, &raw)?,
            None => DEFAULT_PORT,
        };

        let grace_secs = match read(ENV_SHUTDOWN_GRACE) {
            Some(raw) => parse_number(ENV_SHUTDOWN_GRACE, &raw)?,
            None => DEFAULT_SHUTDOWN_GRACE_SECS,
        };

        Ok(Self {
            host: read_or(ENV_HOST, DEFAULT_HOST),
            port,
            environment: read(ENV_ENVIRONMENT)
                .or_else(|| read(ENV_ENVIRONMENT_FALLBACK))
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            version: read_or(ENV_VERSION, DEFAULT_VERSION),
            pod_name: read_or(ENV_POD_NAME, DEFAULT_POD_NAME),
            namespace: read_or(ENV_NAMESPACE, DEFAULT_NAMESPACE),
            shutdown_grace: Duration::from_secs(grace_secs),
            template_dir: read_or(ENV_TEMPLATE_DIR, DEFAULT_TEMPLATE_DIR),
            static_dir: read_or(ENV_STATIC_DIR, DEFAULT_STATIC_DIR),
        })
    }

    /// Whether the environment name is a production-equivalent value.
    pub fn is_production(&self) -> bool {
        let env = self.environment.trim();
        PRODUCTION_ENVIRONMENTS
            .iter()
            .any(|name| env.eq_ignore_ascii_case(name))
    }

    /// Socket address to listen on.
    ///
    /// The host may be an IP literal or a hostname; hostnames are resolved and
    /// the first address wins.
    pub async fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        let invalid = |reason: String| ConfigError::Invalid {
            key: ENV_HOST,
            value: self.host.clone(),
            reason,
        };

        tokio::net::lookup_host((host, self.port))
            .await
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("host resolved to no addresses".to_string()))
    }

    /// Glob handed to Tera for template discovery.
    pub fn template_glob(&self) -> String {
        format!("{}/**/*", self.template_dir.trim_end_matches('/'))
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
