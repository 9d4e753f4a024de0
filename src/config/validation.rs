//! Configuration validation.
//!
//! Startup-time checks for mistakes that would otherwise surface as runtime
//! 502s or router panics: unusable upstream URLs, malformed mount prefixes,
//! zero timeouts. All errors are collected so a broken file reports
//! everything at once.

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single validation failure.
#[derive(Debug)]
pub enum ValidationError {
    NoMounts,
    InvalidUpstreamUrl { url: String, reason: String },
    BadRoutePrefix { mount: String, prefix: String },
    DuplicateRoutePrefix { prefix: String },
    EmptyMountName { prefix: String },
    ZeroTimeout { field: &'static str },
    ZeroBodyLimit,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoMounts => write!(f, "no mounts configured"),
            ValidationError::InvalidUpstreamUrl { url, reason } => {
                write!(f, "invalid upstream base_url '{}': {}", url, reason)
            }
            ValidationError::BadRoutePrefix { mount, prefix } => write!(
                f,
                "mount '{}' has bad route_prefix '{}' (must start with '/', not end with '/', and contain no route syntax)",
                mount, prefix
            ),
            ValidationError::DuplicateRoutePrefix { prefix } => {
                write!(f, "route_prefix '{}' registered more than once", prefix)
            }
            ValidationError::EmptyMountName { prefix } => {
                write!(f, "mount with route_prefix '{}' has an empty name", prefix)
            }
            ValidationError::ZeroTimeout { field } => {
                write!(f, "{} must be greater than zero", field)
            }
            ValidationError::ZeroBodyLimit => {
                write!(f, "security.max_body_size must be greater than zero")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, collecting every failure.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.upstream.base_url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::InvalidUpstreamUrl {
                    url: config.upstream.base_url.clone(),
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
        }
        Err(e) => {
            errors.push(ValidationError::InvalidUpstreamUrl {
                url: config.upstream.base_url.clone(),
                reason: e.to_string(),
            });
        }
    }

    if config.mounts.is_empty() {
        errors.push(ValidationError::NoMounts);
    }

    let mut seen_prefixes = Vec::new();
    for mount in &config.mounts {
        if mount.name.is_empty() {
            errors.push(ValidationError::EmptyMountName {
                prefix: mount.route_prefix.clone(),
            });
        }
        if !valid_route_prefix(&mount.route_prefix) {
            errors.push(ValidationError::BadRoutePrefix {
                mount: mount.name.clone(),
                prefix: mount.route_prefix.clone(),
            });
        }
        if seen_prefixes.contains(&mount.route_prefix) {
            errors.push(ValidationError::DuplicateRoutePrefix {
                prefix: mount.route_prefix.clone(),
            });
        } else {
            seen_prefixes.push(mount.route_prefix.clone());
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "timeouts.request_secs",
        });
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "timeouts.connect_secs",
        });
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A usable prefix registers verbatim as an axum route, so it must carry at
/// least one segment and none of the router's capture syntax.
fn valid_route_prefix(prefix: &str) -> bool {
    prefix.starts_with('/')
        && prefix.len() > 1
        && !prefix.ends_with('/')
        && !prefix.contains(['{', '}', '*'])
}
