//! ffremote client: forwards an ffmpeg invocation to a remote server and
//! mirrors its output, exit code, and cancellation behavior locally.

mod cli;
mod session;

use std::path::PathBuf;

use tracing::info;

use ffremote_config::{
    init_logging, load_client_config, search_paths, ConfigKind, LogDestination,
};
use ffremote_core::address::parse_address;
use ffremote_core::net::connect;

use crate::cli::ClientArgs;

#[tokio::main]
async fn main() {
    let parsed = cli::split_args(std::env::args().skip(1));

    let mut paths = search_paths(ConfigKind::Client);
    if let Some(path) = &parsed.config_path {
        paths = vec![path.clone()];
    }

    if parsed.print_search_paths {
        ffremote_config::paths::print_search_paths(&paths);
        return;
    }

    if parsed.remote_args.is_empty() {
        cli::print_usage();
        return;
    }

    match run(parsed, paths).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("ffremote-client: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(parsed: ClientArgs, paths: Vec<PathBuf>) -> anyhow::Result<i32> {
    let (config, config_path) = load_client_config(&paths)?;

    let destination = LogDestination::resolve(config.log.as_ref())?;
    init_logging(&destination, false)?;
    info!(path = %config_path.display(), "loaded configuration");

    let info = parse_address(&config.address)?;
    info!(address = %config.address, family = info.family.name(), "connecting to server");
    let conn = connect(&info).await?;

    session::run(conn, &config.auth_secret, &parsed.remote_args).await
}
