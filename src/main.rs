//! Single-upstream CORS gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────────┐
//!                         │                       GATEWAY                         │
//!     Browser request     │  ┌──────────┐   ┌────────────┐   ┌───────────────┐   │
//!     ────────────────────┼─▶│   CORS   │──▶│ normalizer │──▶│   forwarder   │───┼──▶ Upstream
//!                         │  │   gate   │   │  (routing) │   │  (upstream)   │   │
//!                         │  └────┬─────┘   └────────────┘   └───────┬───────┘   │
//!                         │       │ OPTIONS ⇒ 200                     │           │
//!     Response            │  ┌────▼─────┐                     ┌───────▼───────┐   │
//!     ◀───────────────────┼──│ headers  │◀────────────────────│ response relay│◀──┼─── Upstream
//!                         │  └──────────┘    error ⇒ 500/502  └───────────────┘   │
//!                         └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_gateway::config::{read_config, validate_config, ConfigError, GatewayConfig};
use cors_gateway::http::GatewayServer;
use cors_gateway::lifecycle::{shutdown_signal, Shutdown};
use cors_gateway::observability::init_logging;

#[derive(Parser)]
#[command(name = "cors-gateway")]
#[command(about = "Browser-facing gateway forwarding to a single upstream", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,

    /// Override `upstream.base_url`.
    #[arg(long)]
    upstream: Option<String>,
}

impl Cli {
    fn load(&self) -> Result<GatewayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => GatewayConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(upstream) = &self.upstream {
            config.upstream.base_url = upstream.clone();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    init_logging(&config.observability.log_level)?;

    tracing::info!("cors-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        trust_mode = config.upstream.trust.label(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let server = GatewayServer::new(config)?;
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
