//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Issue exactly one upstream call per inbound request
//! - Bound the whole exchange (connect, response, body) with one timeout
//! - Buffer the upstream body for translation
//!
//! # Design Decisions
//! - No retries: the proxy cannot know whether the upstream method is
//!   idempotent, so re-execution is unsafe and left to callers
//! - The body passes through unchanged regardless of method; this layer
//!   never strips a body because of the verb
//! - A response body that cannot be read (oversized, connection dropped
//!   mid-stream) degrades to an empty body with the status kept, so the
//!   translator still answers with the upstream's own status code

use std::time::Duration;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tracing::warn;

use crate::config::GatewayConfig;
use crate::routing::UpstreamTarget;

/// Failure modes of a single forward attempt.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The resolved target did not assemble into a usable URI.
    #[error("invalid upstream target '{uri}': {reason}")]
    Target { uri: String, reason: String },

    /// Connection refused, DNS failure, or the connection died before a
    /// response arrived.
    #[error("upstream unreachable")]
    Unreachable(#[source] hyper_util::client::legacy::Error),

    /// The upstream did not complete its response within the bound.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),
}

/// A fully buffered upstream response, ready for translation.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Pooled HTTP client for the single configured upstream.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
    max_response_bytes: usize,
}

impl UpstreamClient {
    /// Build the client from configuration.
    pub fn new(config: &GatewayConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.timeouts.idle_secs))
            .build(connector);

        Self {
            client,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
            max_response_bytes: config.security.max_body_size,
        }
    }

    /// Forward one request to the resolved target.
    ///
    /// The timeout covers the entire exchange. If the caller drops the
    /// returned future (inbound connection closed), the in-flight upstream
    /// call is cancelled with it.
    pub async fn forward(
        &self,
        method: Method,
        target: &UpstreamTarget,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, ForwardError> {
        let uri: Uri = target.uri().parse().map_err(|e: axum::http::uri::InvalidUri| {
            ForwardError::Target {
                uri: target.uri(),
                reason: e.to_string(),
            }
        })?;

        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body))
            .map_err(|e| ForwardError::Target {
                uri: target.uri(),
                reason: e.to_string(),
            })?;
        *request.headers_mut() = headers;

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(ForwardError::Unreachable)?;

            let (parts, body) = response.into_parts();
            let body = match to_bytes(Body::new(body), self.max_response_bytes).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(
                        status = %parts.status,
                        error = %e,
                        "failed to read upstream body, relaying status with empty body"
                    );
                    Bytes::new()
                }
            };

            Ok(UpstreamResponse {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        };

        match tokio::time::timeout(self.request_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ForwardError::Timeout(self.request_timeout)),
        }
    }
}
