//! Subdomain router (v1)
//!
//! Serves a site whose subdomains are routed to separate route tables.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                  SUBDOMAIN ROUTER                     │
//!                  │                                                       │
//!   Client Request │  ┌──────────┐   ┌────────────┐   ┌──────────────┐   │
//!   ───────────────┼─▶│ request  │──▶│ subdomain  │──▶│  url routing │   │
//!                  │  │ id/trace │   │ (Host →    │   │ (label →     │   │
//!                  │  └──────────┘   │  label)    │   │  table)      │   │
//!                  │                 └────────────┘   └──────┬───────┘   │
//!                  │                                         ▼           │
//!   Client Response│                 ┌────────────┐   ┌──────────────┐   │
//!   ◀──────────────┼─────────────────│  handler   │◀──│  dispatch    │   │
//!                  │                 └────────────┘   │ (+ slash)    │   │
//!                  │                                  └──────────────┘   │
//!                  │  config (+ hot reload of [site]) · logging · metrics │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use subdomain_router::config::{load_config, ConfigWatcher};
use subdomain_router::demo::{demo_config, demo_tables};
use subdomain_router::lifecycle::{spawn_signal_handler, Shutdown};
use subdomain_router::observability::{logging, metrics};
use subdomain_router::HttpServer;

#[derive(Parser)]
#[command(name = "subdomain-router")]
#[command(about = "Serve a site with per-subdomain route tables", long_about = None)]
struct Cli {
    /// TOML configuration file; the demo mapping is used when omitted.
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
        None => demo_config(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("subdomain-router v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        domain = %config.site.domain,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must outlive the server.
    let (config_updates, _watcher) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            (updates, Some(watcher.run()?))
        }
        None => (mpsc::unbounded_channel().1, None),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let tables = demo_tables(&config.routing.default_table)?;
    let server = HttpServer::new(config, tables)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
