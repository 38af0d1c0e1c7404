//! Client and server configuration structures and loading.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::jsonc::strip_comments;

/// The `log` field accepts `false` (disabled) or a string destination.
/// A missing or `null` field also disables logging.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LogValue {
    Flag(bool),
    Destination(String),
}

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default)]
    pub log: Option<LogValue>,
    pub address: String,
    pub auth_secret: String,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default)]
    pub log: Option<LogValue>,
    pub address: String,
    pub auth_secret: String,
    pub ffmpeg_path: PathBuf,
    /// `[from, to]` pairs applied in order to every argument.
    #[serde(default)]
    pub rewrites: Vec<(String, String)>,
    /// Mirror subprocess output chunks into the server log.
    #[serde(default)]
    pub debug: bool,
}

fn load_from_path<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let stripped = strip_comments(&content);
    serde_json::from_slice(&stripped).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn load_first<T: serde::de::DeserializeOwned>(paths: &[PathBuf]) -> Result<(T, PathBuf)> {
    for path in paths {
        match load_from_path(path) {
            Ok(config) => return Ok((config, path.clone())),
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Err(ConfigError::NotFound(paths.len()))
}

/// Load the client configuration from the first path that exists.
///
/// Missing files are skipped; any other failure (unreadable file, parse
/// error) aborts the search.
pub fn load_client_config(paths: &[PathBuf]) -> Result<(ClientConfig, PathBuf)> {
    load_first(paths)
}

/// Load the server configuration from the first path that exists.
pub fn load_server_config(paths: &[PathBuf]) -> Result<(ServerConfig, PathBuf)> {
    load_first(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_client_config_with_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "ffremote.client.jsonc",
            r#"{
  // where the server lives
  "log": false,
  "address": "127.0.0.1:5050",
  "authSecret": "secret" /* keep this private */
}"#,
        );

        let (config, loaded_from) = load_client_config(&[path.clone()]).unwrap();
        assert_eq!(loaded_from, path);
        assert_eq!(config.address, "127.0.0.1:5050");
        assert_eq!(config.auth_secret, "secret");
        assert_eq!(config.log, Some(LogValue::Flag(false)));
    }

    #[test]
    fn test_load_server_config_full() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "ffremote.server.jsonc",
            r#"{
  "log": "stderr",
  "address": "/tmp/ffremote.sock",
  "authSecret": "secret",
  "ffmpegPath": "/usr/bin/ffmpeg",
  "rewrites": [["/mnt/media", "/srv/media"], ["D:\\", "/data/"]],
  "debug": true
}"#,
        );

        let (config, _) = load_server_config(&[path]).unwrap();
        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/bin/ffmpeg"));
        assert_eq!(config.rewrites.len(), 2);
        assert_eq!(config.rewrites[0].0, "/mnt/media");
        assert!(config.debug);
        assert_eq!(config.log, Some(LogValue::Destination("stderr".into())));
    }

    #[test]
    fn test_server_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "minimal.jsonc",
            r#"{"address": "0.0.0.0:5050", "authSecret": "s", "ffmpegPath": "/usr/bin/ffmpeg"}"#,
        );
        let (config, _) = load_server_config(&[path]).unwrap();
        assert!(config.rewrites.is_empty());
        assert!(!config.debug);
        assert_eq!(config.log, None);
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist.jsonc");
        let real = write_config(
            &dir,
            "real.jsonc",
            r#"{"address": "a:1", "authSecret": "s"}"#,
        );

        let (_, loaded_from) = load_client_config(&[missing, real.clone()]).unwrap();
        assert_eq!(loaded_from, real);
    }

    #[test]
    fn test_no_config_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.jsonc");
        assert!(matches!(
            load_client_config(&[missing]),
            Err(ConfigError::NotFound(1))
        ));
    }

    #[test]
    fn test_parse_error_aborts_search() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write_config(&dir, "broken.jsonc", "{not json");
        let later = write_config(&dir, "later.jsonc", r#"{"address": "a:1", "authSecret": "s"}"#);
        assert!(matches!(
            load_client_config(&[broken, later]),
            Err(ConfigError::Parse { .. })
        ));
    }
}
