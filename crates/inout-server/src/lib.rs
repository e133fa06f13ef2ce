//! Configuration for the in/out board server binary.

use std::path::{Path, PathBuf};

use inout_core::directory::DirectoryOptions;
use serde::Deserialize;

/// Prefix of environment variables that override the configuration file,
/// e.g. `INOUTBOARD_PORT` or `INOUTBOARD_DIRECTORY__HOST`.
pub const ENV_PREFIX: &str = "INOUTBOARD";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Mark the session cookie `Secure`.
  #[serde(default = "default_secure_cookies")]
  pub secure_cookies: bool,
  pub directory:      DirectoryOptions,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_secure_cookies() -> bool { true }

impl ServerConfig {
  /// Layer the TOML file at `path` (if it exists) under `INOUTBOARD_*`
  /// environment variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::from_sources(
      config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
          config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
        ),
    )
  }

  fn from_sources(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> Result<Self, config::ConfigError> {
    builder.build()?.try_deserialize()
  }

  /// The `host:port` pair to listen on.
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// [`ServerConfig::store_path`] with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(toml: &str) -> Result<ServerConfig, config::ConfigError> {
    ServerConfig::from_sources(
      config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
    )
  }

  const MINIMAL: &str = r#"
    store_path = "/var/lib/inoutboard/board.db"

    [directory]
    host          = "dc1.corp.example"
    realm         = "CORP"
    bind_username = "svc-board"
    bind_password = "hunter2"
    search_base   = "dc=corp,dc=example"
  "#;

  #[test]
  fn defaults_fill_in_optional_settings() {
    let cfg = parse(MINIMAL).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert!(cfg.secure_cookies);
    assert_eq!(cfg.directory.port, 389);
    assert!(cfg.directory.starttls);
    assert!(cfg.directory.verify_tls);
    assert_eq!(cfg.directory.timeout_secs, 10);
    assert_eq!(cfg.directory.service_principal(), "CORP\\svc-board");
  }

  #[test]
  fn explicit_settings_win() {
    let cfg = parse(&format!(
      "host = \"0.0.0.0\"\nport = 9000\nsecure_cookies = false\n{MINIMAL}"
    ))
    .unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:9000");
    assert!(!cfg.secure_cookies);
  }

  #[test]
  fn missing_directory_section_is_an_error() {
    assert!(parse("store_path = \"board.db\"").is_err());
  }

  #[test]
  fn tilde_is_expanded_against_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    let cfg = parse(&MINIMAL.replace("/var/lib/inoutboard", "~/board")).unwrap();
    assert_eq!(
      cfg.resolved_store_path(),
      PathBuf::from(home).join("board/board.db")
    );
  }
}
