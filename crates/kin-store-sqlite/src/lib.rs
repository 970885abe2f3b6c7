//! SQLite backend for the kin family-graph store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime.

mod encode;
mod schema;
mod sql;
mod store;

pub mod config;
pub mod error;

pub use config::{ConnectionOptions, DataSource, ProviderOptions, StoreConfig};
pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
