//! HTTP front for reqtrack.
//!
//! Mounts [`reqtrack_api::api_router`] under `/api`, adds a liveness probe,
//! and wraps everything in request tracing and permissive CORS.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, routing::get};
use reqtrack_api::api_router;
use reqtrack_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `REQTRACK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 3000 }
fn default_store_path() -> PathBuf { PathBuf::from("reqtrack.sqlite") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
    }
  }
}

impl ServerConfig {
  /// Read `path` if it exists, then let `REQTRACK_HOST`, `REQTRACK_PORT`
  /// and `REQTRACK_STORE_PATH` override it.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("REQTRACK"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~/` resolved against `$HOME`.
  pub fn resolved_store_path(&self) -> PathBuf {
    let raw = self.store_path.to_string_lossy();
    match (raw.strip_prefix("~/"), std::env::var_os("HOME")) {
      (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
      _ => self.store_path.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router over `store`.
pub fn router(store: Arc<SqliteStore>) -> Router {
  Router::new()
    .route("/health", get(health))
    .nest("/api", api_router(store))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

async fn health() -> &'static str { "ok" }

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt;

  use super::*;

  async fn app() -> Router {
    router(Arc::new(SqliteStore::open_in_memory().await.unwrap()))
  }

  #[tokio::test]
  async fn health_returns_ok() {
    let resp = app()
      .await
      .oneshot(Request::get("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
  }

  #[tokio::test]
  async fn api_is_nested() {
    let resp = app()
      .await
      .oneshot(Request::get("/api/requirements").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"[]");

    let resp = app()
      .await
      .oneshot(Request::get("/requirements").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn missing_config_file_yields_defaults() {
    let path = std::env::temp_dir().join(format!("reqtrack-{}.toml", unique_suffix()));
    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:3000");
  }

  #[test]
  fn config_file_is_read() {
    let path = std::env::temp_dir().join(format!("reqtrack-{}.toml", unique_suffix()));
    std::fs::write(&path, "host = \"0.0.0.0\"\nstore_path = \"/var/lib/reqtrack.db\"\n").unwrap();
    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.resolved_store_path(), PathBuf::from("/var/lib/reqtrack.db"));
  }

  #[test]
  fn tilde_store_path_is_expanded() {
    let cfg = ServerConfig { store_path: PathBuf::from("~/data/rt.sqlite"), ..Default::default() };
    let resolved = cfg.resolved_store_path();
    if std::env::var_os("HOME").is_some() {
      assert!(resolved.ends_with("data/rt.sqlite"));
      assert!(!resolved.starts_with("~"));
    }
  }

  fn unique_suffix() -> String {
    let nanos = std::time::SystemTime::now()
      .duration_since(std::time::UNIX_EPOCH)
      .unwrap()
      .as_nanos();
    format!("{}-{nanos}", std::process::id())
  }

  #[test]
  fn config_defaults_fill_missing_keys() {
    let cfg: ServerConfig = config::Config::builder()
      .set_override("port", 8080)
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("reqtrack.sqlite"));
    assert_eq!(cfg.address(), "127.0.0.1:8080");
  }
}
