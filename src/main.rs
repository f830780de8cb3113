//! relay-proxy
//!
//! A minimal HTTP forward proxy endpoint built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                   RELAY PROXY                     │
//!                      │                                                   │
//!  Caller request      │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!  + X-Proxy-Url  ─────┼─▶│  http   │──▶│ request  │──▶│   outbound   │   │
//!                      │  │ server  │   │ (target, │   │ (deny-list   │   │
//!                      │  └─────────┘   │ cookies, │   │  headers,    │   │
//!                      │                │ params)  │   │  cookies)    │   │
//!                      │                └──────────┘   └──────┬───────┘   │
//!                      │                                      ▼           │
//!  Caller response     │  ┌──────────┐              ┌──────────────┐      │
//!  + X-Location   ◀────┼──│ response │◀─────────────│   upstream   │◀─────┼──── Target
//!                      │  │(allow-   │              │ (redirects,  │      │     server
//!                      │  │ list)    │              │  10 MiB cap) │      │
//!                      │  └──────────┘              └──────────────┘      │
//!                      └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use relay_proxy::config::{load_config, ProxyConfig};
use relay_proxy::observability::{logging, metrics};
use relay_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "relay-proxy")]
#[command(about = "HTTP forward proxy driven by the X-Proxy-Url header", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_tracing(&config.observability);
    tracing::info!("relay-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        connect_timeout_secs = config.timeouts.connect_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        max_response_body_bytes = config.limits.max_response_body_bytes,
        follow_redirects = config.upstream.follow_redirects,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
