//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream backend the gateway forwards to.
    pub upstream: UpstreamConfig,

    /// Mount definitions mapping inbound prefixes to upstream base paths.
    pub mounts: Vec<MountConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Body limits and header allow-lists.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            mounts: default_mounts(),
            timeouts: TimeoutConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream backend configuration.
///
/// Exactly one upstream base URL exists per deployment. The base URL is
/// scheme + host + optional port; a trailing slash is tolerated here and
/// stripped before use.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the backend API (e.g., "http://127.0.0.1:8000").
    ///
    /// Overridable at startup via the `GATEWAY_UPSTREAM_URL` environment
    /// variable.
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

/// A mount pairs an inbound route prefix with an upstream base path.
///
/// Fixed at registration time; never mutated after startup. The resolver
/// normalizes `base_path` slashes internally, so callers owe no slash
/// discipline here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MountConfig {
    /// Mount identifier for logging/metrics.
    pub name: String,

    /// Inbound virtual prefix (e.g., "/proxy"). Everything after it is
    /// captured as wildcard path segments.
    pub route_prefix: String,

    /// Upstream path prefix the captured segments are appended to
    /// (e.g., "api" or "api/v1/platform/auth").
    pub base_path: String,
}

fn default_mounts() -> Vec<MountConfig> {
    vec![
        MountConfig {
            name: "api".to_string(),
            route_prefix: "/proxy".to_string(),
            base_path: "api".to_string(),
        },
        MountConfig {
            name: "auth".to_string(),
            route_prefix: "/proxy/auth".to_string(),
            base_path: "api/v1/platform/auth".to_string(),
        },
    ]
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for the upstream call, response body
    /// included) in seconds.
    pub request_secs: u64,

    /// Idle pooled-connection timeout in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            idle_secs: 60,
        }
    }
}

/// Body limits and header forwarding policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum buffered body size in bytes, both directions.
    pub max_body_size: usize,

    /// Additional request headers forwarded upstream, beyond the built-in
    /// `Authorization` and `Content-Type`.
    pub allow_request_headers: Vec<String>,

    /// Additional response headers relayed to the caller, beyond
    /// `Content-Type` and the caching headers.
    pub allow_response_headers: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
            allow_request_headers: Vec::new(),
            allow_response_headers: Vec::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
