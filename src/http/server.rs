//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Build one Axum router per mount and merge them into the app
//! - Wire up middleware (request ID, tracing, CORS response headers)
//! - Dispatch non-OPTIONS requests through the forwarding pipeline
//! - Answer CORS preflights locally, without an upstream call
//! - Bind the server and serve until shutdown
//!
//! # Design Decisions
//! - The CORS trio is applied by the outermost layers, so every response
//!   leaving the process carries it, including 404 and 405 fallbacks
//! - Mounts share one handler; only the `MountConfig` in their state differs
//! - Unmatched paths and methods answer in the same JSON error shape as the
//!   pipeline itself, keeping the surface uniformly JSON

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode, Uri},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::config::{GatewayConfig, MountConfig};
use crate::http::request::{ProxyRequestContext, RequestIdExt, RequestIdLayer};
use crate::http::response::ProxyResponse;
use crate::observability::metrics;
use crate::routing::resolver;
use crate::security::headers::{cors_headers, HeaderPolicy};
use crate::upstream::UpstreamClient;

/// Application state shared by every mount.
#[derive(Clone)]
pub struct AppState {
    pub client: UpstreamClient,
    pub policy: Arc<HeaderPolicy>,
    pub base_url: String,
    pub max_body_size: usize,
}

/// Per-mount state: the shared app state plus this mount's configuration.
#[derive(Clone)]
pub struct MountState {
    pub app: AppState,
    pub mount: Arc<MountConfig>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let state = AppState {
            client: UpstreamClient::new(&config),
            policy: Arc::new(HeaderPolicy::from_config(&config.security)),
            base_url: config.upstream.base_url.clone(),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all mounts and middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new();
        for mount in &config.mounts {
            let mount_state = MountState {
                app: state.clone(),
                mount: Arc::new(mount.clone()),
            };
            router = router.merge(mount_router(mount_state));
        }

        router = router
            .fallback(not_found)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http());
        for (name, value) in cors_headers() {
            router = router.layer(SetResponseHeaderLayer::overriding(name, value));
        }
        router
    }

    /// Run the server until the shutdown channel fires, draining in-flight
    /// requests before returning.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mounts = self.config.mounts.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Router for a single mount: the pipeline on `GET/POST/PUT/PATCH/DELETE`,
/// the preflight answer on `OPTIONS`, and a JSON 405 for anything else.
fn mount_router(state: MountState) -> Router {
    let handler = get(proxy_handler)
        .post(proxy_handler)
        .put(proxy_handler)
        .patch(proxy_handler)
        .delete(proxy_handler)
        .options(preflight_handler)
        // axum would otherwise serve HEAD through the GET handler
        .head(method_not_allowed)
        .fallback(method_not_allowed);

    Router::new()
        .route(&state.mount.route_prefix, handler.clone())
        .route(&format!("{}/{{*path}}", state.mount.route_prefix), handler)
        .with_state(state)
}

/// Main proxy handler.
/// Resolves the upstream target, filters headers, forwards, translates.
async fn proxy_handler(
    State(state): State<MountState>,
    request: Request<Body>,
) -> ProxyResponse {
    let start_time = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        mount = %state.mount.name,
        "Proxying request"
    );

    let context = match ProxyRequestContext::from_request(
        request,
        &state.mount.route_prefix,
        state.app.max_body_size,
    )
    .await
    {
        Ok(context) => context,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejecting request body");
            let response =
                ProxyResponse::error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
            metrics::record_request(
                method.as_str(),
                response.status.as_u16(),
                &state.mount.name,
                start_time,
            );
            return response;
        }
    };

    let target = resolver::resolve(
        &state.app.base_url,
        &state.mount,
        &context.path_segments,
        &context.query,
    );
    let headers = state.app.policy.filter_inbound(&context.headers);

    let response = match state
        .app
        .client
        .forward(context.method, &target, headers, context.body)
        .await
    {
        Ok(upstream) => {
            tracing::debug!(
                request_id = %request_id,
                status = upstream.status.as_u16(),
                target = %target.uri(),
                "Upstream responded"
            );
            ProxyResponse::translate(upstream, &state.app.policy)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                target = %target.uri(),
                error = %e,
                "Upstream request failed"
            );
            ProxyResponse::from(e)
        }
    };

    metrics::record_request(
        method.as_str(),
        response.status.as_u16(),
        &state.mount.name,
        start_time,
    );
    response
}

/// CORS preflight answer: 204, no body, no upstream call.
/// The CORS trio itself is stamped on by the outer layers.
async fn preflight_handler(State(state): State<MountState>) -> StatusCode {
    metrics::record_request("OPTIONS", 204, &state.mount.name, Instant::now());
    StatusCode::NO_CONTENT
}

/// JSON 405 for methods outside the supported set.
async fn method_not_allowed(State(state): State<MountState>, method: Method) -> ProxyResponse {
    tracing::warn!(method = %method, mount = %state.mount.name, "Method not allowed");
    let response = ProxyResponse::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    metrics::record_request(method.as_str(), 405, &state.mount.name, Instant::now());
    response
}

/// JSON 404 for paths outside every mount.
async fn not_found(method: Method, uri: Uri) -> ProxyResponse {
    tracing::warn!(method = %method, path = %uri.path(), "No route matched");
    metrics::record_request(method.as_str(), 404, "none", Instant::now());
    ProxyResponse::error(StatusCode::NOT_FOUND, "No matching route")
}
