//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Buffer the inbound body under the configured size limit
//! - Extract the forwarding-relevant parts (method, segments, query, headers)
//!
//! # Design Decisions
//! - A caller-supplied X-Request-Id is kept; one is generated only if absent
//! - The raw URI path is used for segment extraction, so percent-encoding
//!   reaches the upstream untouched
//! - The context owns its data; nothing is shared across requests

use std::task::{Context, Poll};

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{HeaderMap, HeaderValue, Method, Request};
use thiserror::Error;
use tower::{Layer, Service};
use uuid::Uuid;

use crate::routing::segments_from_path;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation ID attached to every inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ensure a request ID header is present, returning the effective ID.
pub fn ensure_request_id(headers: &mut HeaderMap) -> RequestId {
    if let Some(existing) = headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok()) {
        return RequestId(existing.to_string());
    }
    let id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&id) {
        headers.insert(X_REQUEST_ID, value);
    }
    RequestId(id)
}

/// Convenience accessor for the request ID on inbound requests.
pub trait RequestIdExt {
    /// The correlation ID from the headers, or `"unknown"`.
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Tower layer stamping a request ID onto every inbound request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        ensure_request_id(request.headers_mut());
        self.inner.call(request)
    }
}

/// Rejection raised while building a [`ProxyRequestContext`].
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request body too large or unreadable (limit {limit} bytes)")]
    Body { limit: usize },
}

/// Everything the forwarding pipeline needs from one inbound request.
///
/// Constructed fresh per request, consumed by the handler, then dropped.
#[derive(Debug)]
pub struct ProxyRequestContext {
    pub method: Method,
    pub path_segments: Vec<String>,
    pub query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequestContext {
    /// Deconstruct an inbound request relative to a mount prefix.
    pub async fn from_request(
        request: Request<Body>,
        route_prefix: &str,
        max_body_size: usize,
    ) -> Result<Self, RequestError> {
        let (parts, body) = request.into_parts();

        let path_segments = segments_from_path(parts.uri.path(), route_prefix);
        let query = parts.uri.query().unwrap_or("").to_string();

        let body = to_bytes(body, max_body_size)
            .await
            .map_err(|_| RequestError::Body {
                limit: max_body_size,
            })?;

        Ok(Self {
            method: parts.method,
            path_segments,
            query,
            headers: parts.headers,
            body,
        })
    }
}
