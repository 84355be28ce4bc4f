//! HTCPCP/1.0 server (RFC 2324, RFC 7168)
//!
//! A coffee-pot control server that speaks HTTP/1.1 with the HTCPCP
//! extension methods (`BREW`, `WHEN`, `PROPFIND`).
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌─────────┐    ┌─────────┐    ┌──────────┐    ┌──────────┐
//!     ─────────────────────▶│   net   │───▶│  http   │───▶│ routing  │───▶│ handlers │
//!                           │listener │    │ reader  │    │ router   │    │          │
//!                           └─────────┘    │ parser  │    └──────────┘    └────┬─────┘
//!                                          └─────────┘                         │
//!                                                                              ▼
//!     Client Response       ┌──────────┐                                  ┌──────────┐
//!     ◀─────────────────────│ response │◀─────────────────────────────────│   pot    │
//!                           │ encoder  │                                  │  store   │
//!                           └──────────┘                                  └──────────┘
//!
//!     Cross-cutting: config, lifecycle (startup/shutdown/signals), observability
//! ```

use std::path::PathBuf;

use clap::Parser;

use htcpcp::config::{load_config, validate_config, ConfigError, Frontend, ServerConfig};
use htcpcp::lifecycle::{signals, startup, Shutdown};
use htcpcp::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "htcpcp")]
#[command(about = "HTCPCP/1.0 coffee-pot server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Front end: raw or framework (overrides the config file)
    #[arg(long)]
    frontend: Option<Frontend>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = cli.host {
        config.listener.host = host;
    }
    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    if let Some(frontend) = cli.frontend {
        config.frontend = frontend;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability)?;
    tracing::info!("htcpcp v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        max_connections = config.listener.max_connections,
        read_timeout_secs = config.timeouts.read_secs,
        pots = config.pots.len(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let running = startup::start(&config, &shutdown).await?;
    signals::spawn_signal_handler(shutdown.clone());

    running.handle.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
