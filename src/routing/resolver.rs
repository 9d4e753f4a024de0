//! Upstream path resolution.
//!
//! # Responsibilities
//! - Split the inbound path into segments relative to a mount prefix
//! - Combine a mount's base path with those segments into the upstream path
//! - Carry the raw query string through untouched
//!
//! # Design Decisions
//! - Segments are opaque: never percent-decoded, re-encoded, or reordered
//! - Duplicate slashes collapse to one; a trailing slash survives only when
//!   the caller or the base path supplied it
//! - The query is appended verbatim, preserving repeated keys and unescaped
//!   characters exactly as received
//! - Resolution cannot fail; malformed segments are the upstream's concern

use crate::config::MountConfig;

/// Fully resolved upstream destination for a single request.
///
/// Derived, read-only, consumed once by the forwarder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    /// Scheme, host, and optional port. Never ends in a slash.
    pub base_url: String,
    /// Absolute path on the upstream, always starting with `/`.
    pub resolved_path: String,
    /// Raw query string without the leading `?`, or empty.
    pub resolved_query: String,
}

impl UpstreamTarget {
    /// Assemble the full request URI.
    pub fn uri(&self) -> String {
        if self.resolved_query.is_empty() {
            format!("{}{}", self.base_url, self.resolved_path)
        } else {
            format!("{}{}?{}", self.base_url, self.resolved_path, self.resolved_query)
        }
    }
}

/// Resolve a mount plus captured segments against an upstream base URL.
pub fn resolve(
    base_url: &str,
    mount: &MountConfig,
    segments: &[String],
    query: &str,
) -> UpstreamTarget {
    let mut raw = String::with_capacity(mount.base_path.len() + 16);
    raw.push('/');
    raw.push_str(&mount.base_path);
    raw.push('/');
    raw.push_str(&segments.join("/"));

    let mut path = collapse_slashes(&raw);
    if segments.is_empty() && !mount.base_path.ends_with('/') && path.len() > 1 {
        path.pop();
    }

    UpstreamTarget {
        base_url: base_url.trim_end_matches('/').to_string(),
        resolved_path: path,
        resolved_query: query.to_string(),
    }
}

/// Split an inbound request path into segments relative to a mount prefix.
///
/// The remainder after the prefix keeps empty segments (`/a//b` yields
/// `["a", "", "b"]`) so that an inbound trailing slash survives resolution
/// while interior duplicates still collapse.
pub fn segments_from_path(path: &str, route_prefix: &str) -> Vec<String> {
    let rest = path.strip_prefix(route_prefix).unwrap_or("");
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    if rest.is_empty() {
        Vec::new()
    } else {
        rest.split('/').map(str::to_string).collect()
    }
}

/// Collapse runs of consecutive slashes to a single slash.
fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !prev_slash {
                out.push(c);
            }
            prev_slash = true;
        } else {
            out.push(c);
            prev_slash = false;
        }
    }
    out
}
