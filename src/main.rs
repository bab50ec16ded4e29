//! IP-check gate
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ timeout
//!                                              │
//!                                              ▼
//!                                      ┌──────────────┐
//!                                      │  rate limit  │──── 429
//!                                      └──────┬───────┘
//!                                             ▼
//!                                      ┌──────────────┐    ┌──────────────┐
//!                                      │ access gate  │───▶│  reputation  │ (ip-api)
//!                                      │              │───▶│  audit store │ (sqlite)
//!                                      └──────┬───────┘    └──────────────┘
//!                          403 / 502 / echo ◀─┤
//!                                             ▼
//!                          content file | audit console | 204 | 404
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ipcheck_gate::config::{finalize, load_config, GateConfig};
use ipcheck_gate::observability::{logging, metrics};
use ipcheck_gate::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "ipcheck-gate")]
#[command(about = "Rate-limited, audited IP-check gate", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => finalize(GateConfig::default())?,
    };

    logging::init_tracing(&config.observability);
    tracing::info!("ipcheck-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        audit_backend = ?config.audit.backend,
        rate_limit_max = config.rate_limit.max_requests,
        rate_limit_window_secs = config.rate_limit.window_secs,
        "Configuration loaded"
    );
    if config.credential.value == GateConfig::default().credential.value {
        tracing::warn!("Credential is the built-in placeholder; set GATE_CREDENTIAL_VALUE");
    }

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
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::from_config(config).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.trigger_on_ctrl_c());

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
