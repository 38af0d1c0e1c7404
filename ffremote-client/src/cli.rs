//! Command-line splitting for the client.
//!
//! The client cannot use an ordinary flag parser: everything it does not
//! recognize belongs to the remote transcoder, including arguments that look
//! like flags. Only `--config` and `--debug-print-search-paths` are stripped;
//! the rest passes through verbatim, order preserved.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientArgs {
    /// Explicit config path, replacing the search path entirely.
    pub config_path: Option<PathBuf>,
    /// Print the config search paths and exit.
    pub print_search_paths: bool,
    /// The argument vector forwarded to the remote transcoder.
    pub remote_args: Vec<String>,
}

/// Split the raw argument vector into our flags and the remote arguments.
pub fn split_args(argv: impl IntoIterator<Item = String>) -> ClientArgs {
    let mut config_path = None;
    let mut print_search_paths = false;
    let mut remote_args = Vec::new();

    let mut iter = argv.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" || arg == "-config" {
            if let Some(value) = iter.next() {
                config_path = Some(PathBuf::from(value));
            }
        } else if let Some(value) = arg.strip_prefix("--config=") {
            config_path = Some(PathBuf::from(value));
        } else if arg == "--debug-print-search-paths" || arg == "-debug-print-search-paths" {
            print_search_paths = true;
        } else {
            remote_args.push(arg);
        }
    }

    ClientArgs {
        config_path,
        print_search_paths,
        remote_args,
    }
}

pub fn print_usage() {
    println!("Usage: ffremote-client [options] [ffmpeg args...]");
    println!("Options:");
    println!("  --config <path>               Path to config file");
    println!("  --debug-print-search-paths    Print config search paths and exit");
    println!();
    println!("All other arguments are passed to the remote transcoder.");
}
