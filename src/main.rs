//! Bridge daemon entry point.
//!
//! Loads configuration, starts the connection manager and keeps the player
//! channel pair alive. The connector that talks to the actual player is an
//! external collaborator; until one is attached, outbound commands are
//! drained and logged so sessions never block on a full channel.

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::watch;
use tracing::{debug, info};

use snapmeta::{
    Result,
    config::{Config, ConfigPaths},
    player::PlayerLink,
    server, tracing_config,
};

/// Snapcast stream metadata and control bridge.
#[derive(Debug, Parser)]
#[command(name = "snapmeta", version, about)]
struct Args {
    /// Path to the configuration file (defaults to the XDG config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured listen host.
    #[arg(long)]
    host: Option<String>,

    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the configured artwork base URL.
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_config::init_with_file()?;

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => ConfigPaths::main_config()?,
    };
    let mut config = Config::load(&config_path)?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(base_url) = args.base_url {
        config.art.base_url = base_url;
    }

    info!(
        "Starting snapmeta bridge on tcp://{}:{}",
        config.server.host, config.server.port
    );

    let (link, mut endpoint) = PlayerLink::channel(32);

    // Placeholder drain until a player connector takes over the endpoint;
    // it also keeps the event publish side alive.
    tokio::spawn(async move {
        while let Some(command) = endpoint.commands.recv().await {
            let (name, param) = command.encode();
            debug!("Upstream command with no player attached: {name} {param:?}");
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    server::run(&config, link, shutdown_rx).await
}
