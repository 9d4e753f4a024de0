//! Response translation.
//!
//! # Responsibilities
//! - Re-frame the upstream body as canonical JSON
//! - Substitute a sentinel payload when the upstream body is not JSON
//! - Map forwarding failures onto 502/504 JSON error responses
//!
//! # Design Decisions
//! - The upstream status code is preserved verbatim, even when the body is
//!   replaced by the sentinel; only transport failures synthesize a status
//! - Callers always receive a JSON body, never a raw or empty passthrough,
//!   so JSON-consuming clients never need a second parse path
//! - CORS headers are attached by the server's outer layers, not here, so
//!   the guarantee also covers responses this type never sees

use axum::body::Body;
use axum::http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use crate::security::HeaderPolicy;
use crate::upstream::{ForwardError, UpstreamResponse};

/// Message carried by the sentinel payload when the upstream body does not
/// parse as JSON.
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON from API";

/// Outbound response, fully decided: status, filtered headers, JSON body.
#[derive(Debug)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

impl ProxyResponse {
    /// Translate a buffered upstream response.
    ///
    /// The body is parsed as JSON and re-serialized on the way out; a body
    /// that does not parse (empty, HTML error page, truncated stream) is
    /// replaced by the sentinel while the status passes through unchanged.
    pub fn translate(upstream: UpstreamResponse, policy: &HeaderPolicy) -> Self {
        let json = match serde_json::from_slice(&upstream.body) {
            Ok(value) => value,
            Err(_) => sentinel_payload(),
        };
        Self {
            status: upstream.status,
            headers: policy.filter_outbound(&upstream.headers),
            json,
        }
    }

    /// A synthesized error response in the same `{ ok, message }` shape.
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            json: json!({ "ok": false, "message": message }),
        }
    }
}

impl From<ForwardError> for ProxyResponse {
    fn from(err: ForwardError) -> Self {
        match err {
            ForwardError::Target { .. } => {
                ProxyResponse::error(StatusCode::BAD_GATEWAY, "Invalid upstream target")
            }
            ForwardError::Unreachable(_) => {
                ProxyResponse::error(StatusCode::BAD_GATEWAY, "Upstream unreachable")
            }
            ForwardError::Timeout(_) => {
                ProxyResponse::error(StatusCode::GATEWAY_TIMEOUT, "Upstream timeout")
            }
        }
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let body = serde_json::to_vec(&self.json)
            .unwrap_or_else(|_| serde_json::to_vec(&sentinel_payload()).unwrap_or_default());

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        // the body is re-serialized JSON no matter what the upstream said
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

fn sentinel_payload() -> Value {
    json!({ "ok": false, "message": INVALID_JSON_MESSAGE })
}
