//! API Gateway
//!
//! A small HTTP gateway that fronts a single backend API for browser clients.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────────┐
//!                    │                    API GATEWAY                      │
//!                    │                                                     │
//!   Client Request   │  ┌────────┐   ┌──────────┐   ┌───────────────┐     │
//!   ─────────────────┼─▶│ mount  │──▶│ resolver │──▶│ header policy │──┐  │
//!                    │  │ router │   │          │   │ (inbound)     │  │  │
//!                    │  └────────┘   └──────────┘   └───────────────┘  │  │
//!                    │                                                  ▼  │
//!                    │                                      ┌──────────────┐
//!                    │                                      │   upstream   │──▶ Backend
//!                    │                                      │    client    │◀──   API
//!   Client Response  │  ┌────────┐   ┌────────────┐         └──────┬───────┘
//!   ◀────────────────┼──│  CORS  │◀──│ translator │◀───────────────┘  │
//!                    │  │ layers │   │ (JSON)     │                    │
//!                    │  └────────┘   └────────────┘                    │
//!                    │                                                  │
//!                    │  config · observability · lifecycle · security   │
//!                    └────────────────────────────────────────────────────┘
//! ```
//!
//! `OPTIONS` requests short-circuit at the mount router: the preflight
//! handler answers 204 locally and the upstream is never contacted.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_gateway::config::{loader, GatewayConfig};
use api_gateway::lifecycle::{signals, Shutdown};
use api_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "HTTP gateway fronting a single backend API", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("api-gateway v0.1.0 starting");

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => {
            let mut config = GatewayConfig::default();
            loader::apply_env_overrides(&mut config);
            config
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        mounts = config.mounts.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Initialize metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            api_gateway::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    // Create and run HTTP server
    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
