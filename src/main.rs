//! Failover router
//!
//! A health-aware round-robin router built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 ROUTER                        │
//!     Client Request      │  ┌─────────┐    ┌──────────┐   ┌──────────┐  │
//!     ────────────────────┼─▶│  http   │───▶│ routing  │──▶│ instance │──┼──▶ Backend
//!                         │  │ server  │    │  relay   │   │   pool   │  │    instances
//!     Client Response     │  └─────────┘    └──────────┘   └────▲─────┘  │
//!     ◀───────────────────┼──── backend JSON / 500 no backends   │        │
//!                         │                                 ┌────┴─────┐  │
//!     Admin (/add_instance│                                 │  health  │──┼──▶ GET /health
//!     /remove_instance,   │                                 │ monitor  │  │    every interval
//!     /health, /)         │                                 └──────────┘  │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use clap::Parser;
use tokio::net::TcpListener;

use failover_router::config::loader::{load_config, validated};
use failover_router::config::RouterConfig;
use failover_router::lifecycle::{signals, Shutdown};
use failover_router::observability::{logging, metrics};
use failover_router::HttpServer;

#[derive(Parser)]
#[command(name = "failover-router")]
#[command(about = "Round-robin router with background health checks and failover", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    let config = validated(config)?;

    logging::init_logging(config.observability.log_format);

    tracing::info!("failover-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        forward_timeout_secs = config.timeouts.forward_secs,
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

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
