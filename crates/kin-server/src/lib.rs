//! HTTP server wiring for kin: configuration and the top-level router.
//!
//! The binary in `main.rs` reads a [`ServerConfig`], opens a
//! [`kin_store_sqlite::SqliteStore`] from it and serves [`router`].

use std::sync::Arc;

use axum::Router;
use kin_core::store::Store;
use kin_store_sqlite::StoreConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and `KIN_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  /// Connection string, e.g. `Data Source=kin.db;UseAffectedRows=True`.
  pub connection:            String,
  #[serde(default = "enabled")]
  pub use_affected_rows:     bool,
  #[serde(default = "enabled")]
  pub treat_tiny_as_boolean: bool,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn enabled() -> bool { true }

impl ServerConfig {
  pub fn store_config(&self) -> StoreConfig {
    StoreConfig {
      connection:            self.connection.clone(),
      use_affected_rows:     self.use_affected_rows,
      treat_tiny_as_boolean: self.treat_tiny_as_boolean,
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server [`Router`]: the JSON API under `/api`, with request
/// tracing.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: Store + Clone + 'static,
{
  Router::new()
    .nest("/api", kin_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}
