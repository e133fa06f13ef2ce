//! inout-board server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `INOUTBOARD_*` environment variables, opens the SQLite roster, and serves
//! the board's JSON API over HTTP.
//!
//! # Maintenance modes
//!
//! ```text
//! server --check-directory   # bind the service account and exit
//! server --update-users      # refresh every profile from the directory and exit
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use inout_api::AppState;
use inout_auth::Authenticator;
use inout_ldap::{DirectoryClient, LdapDirectory};
use inout_server::ServerConfig;
use inout_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "In/out board server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Refresh every known person's profile from the directory, print a JSON
  /// report and exit.
  #[arg(long, conflicts_with = "check_directory")]
  update_users: bool,

  /// Bind with the configured service account and exit.
  #[arg(long)]
  check_directory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing. Logs go to stderr; stdout carries command output.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  // Open SQLite store.
  let store_path = server_cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Build the authenticator.
  let realm = server_cfg.directory.realm.clone();
  let transport = LdapDirectory::new(server_cfg.directory.clone());
  let auth = Arc::new(Authenticator::new(
    Arc::new(store),
    DirectoryClient::new(transport, realm),
  ));

  if cli.check_directory {
    auth
      .directory()
      .bind_as_service()
      .await
      .context("service account bind failed")?;
    tracing::info!(host = %server_cfg.directory.host, "directory reachable");
    return Ok(());
  }

  if cli.update_users {
    let report = auth
      .refresh_from_directory()
      .await
      .context("directory refresh failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_complete() {
      anyhow::bail!("{} people could not be refreshed", report.failed.len());
    }
    return Ok(());
  }

  let app = inout_api::router(AppState {
    auth,
    secure_cookies: server_cfg.secure_cookies,
  });
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
