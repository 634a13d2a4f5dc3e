//! reqtrack server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) under
//! `REQTRACK_*` environment overrides, opens the SQLite store, and serves
//! the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use reqtrack_server::ServerConfig;
use reqtrack_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "reqtrack API server")]
struct Cli {
  /// TOML configuration file; missing is fine.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

  let store_path = cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("opening store at {}", store_path.display()))?;
  tracing::info!(store = %store_path.display(), "store ready");

  let address = cfg.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("binding {address}"))?;
  tracing::info!("reqtrack listening on http://{address}");

  axum::serve(listener, reqtrack_server::router(Arc::new(store)))
    .await
    .context("server error")
}
