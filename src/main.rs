//! API security gateway
//!
//! An HTTP gateway that runs every request through a threat-detection
//! engine before it reaches an application handler.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌───────────────────────────────────────────────┐
//!                          │                SECURITY GATEWAY               │
//!                          │                                               │
//!     Client Request       │  ┌─────────┐    ┌────────────┐                │
//!     ─────────────────────┼─▶│ gateway │───▶│  security  │                │
//!                          │  │ adapter │    │   engine   │                │
//!                          │  └─────────┘    └─────┬──────┘                │
//!                          │                       │ first threat wins     │
//!                          │        ┌──────────────┼──────────────┐        │
//!                          │        ▼              ▼              ▼        │
//!                          │  ┌──────────┐   ┌──────────┐   ┌──────────┐   │
//!                          │  │   rate   │   │  enum.   │   │ payload  │   │
//!                          │  │ limiter  │   │  delay   │   │ patterns │   │
//!                          │  └──────────┘   └──────────┘   └──────────┘   │
//!                          │                       │                       │
//!                          │              threat?  ▼                       │
//!     403 / handler        │  ┌─────────┐    ┌────────────┐                │
//!     ◀────────────────────┼──│ verdict │◀───│ alert fan- │──▶ log sink    │
//!                          │  └─────────┘    │    out     │──▶ webhook     │
//!                          │                 └────────────┘                │
//!                          │                                               │
//!                          │  ┌─────────────────────────────────────────┐  │
//!                          │  │          Cross-Cutting Concerns         │  │
//!                          │  │  config + hot reload │ observability    │  │
//!                          │  │  lifecycle/shutdown  │ metrics endpoint │  │
//!                          │  └─────────────────────────────────────────┘  │
//!                          └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_security_engine::config::{load_config, ConfigWatcher};
use api_security_engine::gateway::{GatewayServer, Shutdown};
use api_security_engine::EngineConfig;

#[derive(Parser)]
#[command(name = "api-security-engine")]
#[command(about = "HTTP gateway with an in-process threat-detection engine")]
struct Cli {
    /// Path to a TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_security_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("api-security-engine v0.1.0 starting");

    // Load configuration
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    tracing::info!(
        bind_address = %config.gateway.bind_address,
        rate_limiter = config.rate_limiter.enabled,
        enumeration = config.enumeration.enabled,
        payload = config.payload.enabled,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.gateway.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Initialize metrics server
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            api_security_engine::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Watch the config file for hot reload when one was given.
    let (_watcher_guard, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            // No file to watch; the channel stays empty and closes.
            let (_tx, updates) = tokio::sync::mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    // Create and run the gateway
    let server = GatewayServer::new(config)?;
    server
        .run(listener, config_updates, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
