//! ffremote server: listens for client connections and runs the configured
//! transcoder binary on their behalf.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ffremote_config::{
    init_logging, load_server_config, search_paths, ConfigKind, LogDestination,
};
use ffremote_core::address::parse_address;
use ffremote_core::Listener;
use ffremote_server::{serve, ProcessRegistry};

/// Remote transcoder execution server.
#[derive(Parser, Debug)]
#[command(name = "ffremote-server", version)]
struct Args {
    /// Path to the config file (replaces the search path)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print config search paths and exit
    #[arg(long)]
    debug_print_search_paths: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut paths = search_paths(ConfigKind::Server);
    if let Some(path) = args.config {
        paths = vec![path];
    }

    if args.debug_print_search_paths {
        ffremote_config::paths::print_search_paths(&paths);
        return Ok(());
    }

    let (config, config_path) = load_server_config(&paths)?;
    let destination = LogDestination::resolve(config.log.as_ref())?;
    init_logging(&destination, config.debug)?;
    println!("Loaded config from: {}", config_path.display());

    let info = parse_address(&config.address)?;
    let listener = Listener::bind(&info).await?;
    println!(
        "Server listening on {} ({})",
        config.address,
        info.family.name()
    );
    info!(address = %config.address, family = info.family.name(), "server listening");

    let root = CancellationToken::new();
    let signal_token = root.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        eprintln!("Received interrupt signal, shutting down...");
        signal_token.cancel();
    });

    let registry = Arc::new(ProcessRegistry::new());
    serve(listener, Arc::new(config), registry, root).await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler");
            let _ = ctrl_c.await;
        }
    }
}
