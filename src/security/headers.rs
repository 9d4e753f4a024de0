//! Header forwarding policy.
//!
//! # Responsibilities
//! - Decide which inbound headers reach the upstream
//! - Decide which upstream response headers reach the caller
//! - Produce the fixed CORS header set attached to every response
//!
//! # Design Decisions
//! - Allow-list, not deny-list: anything not explicitly permitted is dropped,
//!   so internal routing metadata never leaks upstream
//! - Hop-by-hop headers are refused even when configured; the transport
//!   recomputes framing on both legs
//! - Duplicate header values collapse last-write-wins
//! - Filtering is pure: no header is synthesized, renamed, or re-encoded

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION, CACHE_CONTROL,
    CONTENT_TYPE, ETAG, EXPIRES, LAST_MODIFIED,
};
use tracing::warn;

use crate::config::schema::SecurityConfig;

/// Value of `Access-Control-Allow-Origin` on every response.
pub const CORS_ALLOW_ORIGIN: &str = "*";
/// Value of `Access-Control-Allow-Methods` on every response.
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
/// Value of `Access-Control-Allow-Headers` on every response.
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Immutable forwarding policy, built once at startup and shared by every
/// request handler.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    inbound_allowed: Vec<HeaderName>,
    outbound_allowed: Vec<HeaderName>,
}

impl HeaderPolicy {
    /// Build the policy from configuration.
    ///
    /// `Authorization` and `Content-Type` are always forwarded upstream;
    /// `Content-Type` and standard caching headers are always forwarded back.
    /// Configured extras are added on top. Invalid or hop-by-hop names in the
    /// config are logged and skipped rather than rejected, so one typo does
    /// not take the gateway down.
    pub fn from_config(security: &SecurityConfig) -> Self {
        let mut inbound_allowed = vec![AUTHORIZATION, CONTENT_TYPE];
        extend_allowed(
            &mut inbound_allowed,
            &security.allow_request_headers,
            "request",
        );

        let mut outbound_allowed =
            vec![CONTENT_TYPE, CACHE_CONTROL, ETAG, LAST_MODIFIED, EXPIRES];
        extend_allowed(
            &mut outbound_allowed,
            &security.allow_response_headers,
            "response",
        );

        Self {
            inbound_allowed,
            outbound_allowed,
        }
    }

    /// Filter inbound request headers down to the upstream-bound set.
    pub fn filter_inbound(&self, headers: &HeaderMap) -> HeaderMap {
        filter(headers, &self.inbound_allowed)
    }

    /// Filter upstream response headers down to the caller-bound set.
    pub fn filter_outbound(&self, headers: &HeaderMap) -> HeaderMap {
        filter(headers, &self.outbound_allowed)
    }
}

/// The fixed CORS trio merged into every response this layer produces,
/// success or failure.
pub fn cors_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ),
        (
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ),
        (
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ),
    ]
}

fn filter(headers: &HeaderMap, allowed: &[HeaderName]) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (name, value) in headers {
        if allowed.contains(name) {
            // insert, not append: duplicates collapse last-write-wins
            filtered.insert(name.clone(), value.clone());
        }
    }
    filtered
}

fn extend_allowed(allowed: &mut Vec<HeaderName>, configured: &[String], direction: &str) {
    for raw in configured {
        match HeaderName::from_bytes(raw.as_bytes()) {
            Ok(name) if is_hop_by_hop(&name) => {
                warn!(header = %name, direction, "ignoring hop-by-hop header in allow-list");
            }
            Ok(name) => {
                if !allowed.contains(&name) {
                    allowed.push(name);
                }
            }
            Err(_) => {
                warn!(header = %raw, direction, "ignoring invalid header name in allow-list");
            }
        }
    }
}

/// Connection-scoped headers plus the framing headers the transport owns.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
            | "host"
            | "content-length"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> HeaderPolicy {
        HeaderPolicy::from_config(&SecurityConfig::default())
    }

    #[test]
    fn test_authorization_forwarded_byte_for_byte() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.DEF.123=="),
        );
        let filtered = policy().filter_inbound(&headers);
        assert_eq!(
            filtered.get(AUTHORIZATION).unwrap().as_bytes(),
            b"Bearer abc.DEF.123=="
        );
    }

    #[test]
    fn test_authorization_never_synthesized() {
        let filtered = policy().filter_inbound(&HeaderMap::new());
        assert!(filtered.get(AUTHORIZATION).is_none());
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_unlisted_headers_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("cookie", HeaderValue::from_static("session=secret"));
        headers.insert("x-internal-route", HeaderValue::from_static("edge-7"));
        let filtered = policy().filter_inbound(&headers);
        assert_eq!(filtered.len(), 1);
        assert!(filtered.get(CONTENT_TYPE).is_some());
    }

    #[test]
    fn test_hop_by_hop_dropped_even_when_configured() {
        let config = SecurityConfig {
            allow_request_headers: vec!["Host".to_string(), "Content-Length".to_string()],
            ..SecurityConfig::default()
        };
        let policy = HeaderPolicy::from_config(&config);
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("gateway.local"));
        headers.insert("content-length", HeaderValue::from_static("42"));
        assert!(policy.filter_inbound(&headers).is_empty());
    }

    #[test]
    fn test_configured_extra_forwarded() {
        let config = SecurityConfig {
            allow_request_headers: vec!["X-Request-Id".to_string()],
            ..SecurityConfig::default()
        };
        let policy = HeaderPolicy::from_config(&config);
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("req-1"));
        assert!(policy.filter_inbound(&headers).get("x-request-id").is_some());
    }

    #[test]
    fn test_invalid_configured_name_skipped() {
        let config = SecurityConfig {
            allow_request_headers: vec!["not a header\n".to_string()],
            ..SecurityConfig::default()
        };
        // must not panic, and the base allow-list still works
        let policy = HeaderPolicy::from_config(&config);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        assert!(policy.filter_inbound(&headers).get(AUTHORIZATION).is_some());
    }

    #[test]
    fn test_duplicates_collapse_last_write_wins() {
        let mut headers = HeaderMap::new();
        headers.append(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.append(CACHE_CONTROL, HeaderValue::from_static("max-age=60"));
        let filtered = policy().filter_outbound(&headers);
        assert_eq!(filtered.get_all(CACHE_CONTROL).iter().count(), 1);
        assert_eq!(filtered.get(CACHE_CONTROL).unwrap(), "max-age=60");
    }

    #[test]
    fn test_outbound_keeps_caching_strips_framing() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ETAG, HeaderValue::from_static("\"v3\""));
        headers.insert("content-length", HeaderValue::from_static("128"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        let filtered = policy().filter_outbound(&headers);
        assert!(filtered.get(CONTENT_TYPE).is_some());
        assert!(filtered.get(ETAG).is_some());
        assert!(filtered.get("content-length").is_none());
        assert!(filtered.get("transfer-encoding").is_none());
        assert!(filtered.get("connection").is_none());
    }

    #[test]
    fn test_cors_trio_values() {
        let trio = cors_headers();
        assert_eq!(trio[0].1, "*");
        assert_eq!(trio[1].1, "GET, POST, PUT, PATCH, DELETE, OPTIONS");
        assert_eq!(trio[2].1, "Content-Type, Authorization");
    }
}
