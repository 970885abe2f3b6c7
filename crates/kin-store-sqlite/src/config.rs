//! Connection configuration.
//!
//! A store is configured with one connection string. [`StoreConfig`] holds
//! the caller-supplied part and appends the two provider options, and
//! [`ConnectionOptions`] parses the rendered string back into what the
//! SQLite backend needs.

use std::{path::PathBuf, str::FromStr};

use serde::Deserialize;

use crate::Error;

// ─── Provider options ────────────────────────────────────────────────────────

/// Behaviour switches carried in the connection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderOptions {
  /// `UseAffectedRows`: updates and deletes must touch exactly one row, and
  /// saves report the rows actually affected.
  pub use_affected_rows:     bool,
  /// `TreatTinyAsBoolean`: boolean columns stored as tiny integers decode
  /// as booleans (non-zero is `true`).
  pub treat_tiny_as_boolean: bool,
}

impl Default for ProviderOptions {
  fn default() -> Self {
    Self { use_affected_rows: true, treat_tiny_as_boolean: true }
  }
}

// ─── StoreConfig ─────────────────────────────────────────────────────────────

/// Store settings as read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Connection string, e.g. `Data Source=kin.db;`.
  pub connection:            String,
  #[serde(default = "enabled")]
  pub use_affected_rows:     bool,
  #[serde(default = "enabled")]
  pub treat_tiny_as_boolean: bool,
}

fn enabled() -> bool { true }

impl StoreConfig {
  pub fn new(connection: impl Into<String>) -> Self {
    Self {
      connection:            connection.into(),
      use_affected_rows:     true,
      treat_tiny_as_boolean: true,
    }
  }

  /// The connection string followed by the provider options.
  pub fn connection_string(&self) -> String {
    let mut rendered = self.connection.trim().to_owned();
    if !rendered.is_empty() && !rendered.ends_with(';') {
      rendered.push(';');
    }
    rendered.push_str(&format!(
      "UseAffectedRows={};TreatTinyAsBoolean={};",
      flag(self.use_affected_rows),
      flag(self.treat_tiny_as_boolean),
    ));
    rendered
  }
}

fn flag(on: bool) -> &'static str { if on { "True" } else { "False" } }

// ─── Parsed connection string ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
  Memory,
  File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
  pub data_source: DataSource,
  pub provider:    ProviderOptions,
}

impl ConnectionOptions {
  pub fn in_memory() -> Self {
    Self { data_source: DataSource::Memory, provider: ProviderOptions::default() }
  }
}

impl FromStr for ConnectionOptions {
  type Err = Error;

  /// Parse `key=value;` pairs. Keys are case-insensitive and may contain
  /// spaces (`Data Source`). A segment without `=` is taken as the database
  /// path. Keys meant for other providers (`uid`, `pwd`, …) are ignored.
  fn from_str(s: &str) -> Result<Self, Error> {
    let mut data_source = None;
    let mut provider = ProviderOptions::default();

    for segment in s.split(';').map(str::trim).filter(|s| !s.is_empty()) {
      let Some((key, value)) = segment.split_once('=') else {
        data_source = Some(source(segment));
        continue;
      };
      let key: String = key
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
      let value = value.trim();

      match key.as_str() {
        "datasource" | "database" | "server" | "filename" => {
          data_source = Some(source(value));
        }
        "useaffectedrows" => provider.use_affected_rows = parse_flag(&key, value)?,
        "treattinyasboolean" => {
          provider.treat_tiny_as_boolean = parse_flag(&key, value)?
        }
        _ => tracing::debug!(key = %key, "ignoring connection string option"),
      }
    }

    let data_source = data_source.ok_or_else(|| {
      Error::Config("connection string names no data source".into())
    })?;
    Ok(Self { data_source, provider })
  }
}

fn source(value: &str) -> DataSource {
  if value.eq_ignore_ascii_case(":memory:") {
    DataSource::Memory
  } else {
    DataSource::File(PathBuf::from(value))
  }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, Error> {
  match value.to_ascii_lowercase().as_str() {
    "true" | "yes" | "on" | "1" => Ok(true),
    "false" | "no" | "off" | "0" => Ok(false),
    _ => Err(Error::Config(format!("{key}: expected a boolean, got {value:?}"))),
  }
}
