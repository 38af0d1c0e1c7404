//! Configuration search paths.

use std::path::PathBuf;

/// Which of the two programs is looking for its config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Client,
    Server,
}

impl ConfigKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }

    /// Environment variable that overrides the search path entirely.
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Client => "FFREMOTE_CLIENT_CONFIG",
            Self::Server => "FFREMOTE_SERVER_CONFIG",
        }
    }
}

/// Candidate config locations, in order of preference: the environment
/// override, the working directory, the home directory, the executable's
/// directory, then system-wide paths.
pub fn search_paths(kind: ConfigKind) -> Vec<PathBuf> {
    let name = format!("ffremote.{}.jsonc", kind.name());
    let hidden = format!(".ffremote.{}.jsonc", kind.name());

    let mut paths = Vec::new();

    if let Some(env_path) = std::env::var_os(kind.env_var()) {
        if !env_path.is_empty() {
            paths.push(PathBuf::from(env_path));
        }
    }

    let current_dir = std::env::current_dir().ok();
    if let Some(dir) = &current_dir {
        paths.push(dir.join(&name));
        paths.push(dir.join(&hidden));
    }

    if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        let home = PathBuf::from(home);
        paths.push(home.join(&hidden));
        paths.push(home.join(".config").join(&name));
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from));
    if let Some(dir) = exe_dir {
        if current_dir.as_ref() != Some(&dir) {
            paths.push(dir.join(&name));
            paths.push(dir.join(&hidden));
        }
    }

    paths.push(PathBuf::from("/etc").join(&name));
    paths.push(PathBuf::from("/usr/local/etc").join(&name));

    paths
}

/// Print the search paths the way `--debug-print-search-paths` reports them.
pub fn print_search_paths(paths: &[PathBuf]) {
    println!("Configuration search paths (in order of preference):");
    for (i, path) in paths.iter().enumerate() {
        println!("{}. {}", i + 1, path.display());
    }
}
