//! Insight gateway binary entry point.
//!
//! Loads TOML configuration, builds the engine, and serves the HTTP
//! gateway until ctrl-c.

use anyhow::Result;
use clap::Parser;
use insight_gateway::config::{self, CONFIG_FILE};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// HTTP gateway for dataset ingestion and queries.
#[derive(Parser, Debug)]
#[command(name = "insight-gateway", version)]
struct Cli {
    /// Config file. Defaults to `gateway.toml` in the platform config dir.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Bind address (host:port). Overrides the config file.
    #[arg(long)]
    bind: Option<String>,
    /// Write a default config directory at this path and exit.
    #[arg(long, value_name = "DIR")]
    init: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing from RUST_LOG (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(dir) = cli.init {
        let path = config::scaffold_config_dir(&dir)?;
        tracing::info!("wrote default config to {}", path.display());
        return Ok(());
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => config::global_config_dir()?.join(CONFIG_FILE),
    };
    let handle = insight_gateway::serve(&config_path, cli.bind.as_deref()).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("received ctrl-c, shutting down");
    handle.shutdown().await
}
