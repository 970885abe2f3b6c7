//! The `Store` trait and the staged changes it commits.
//!
//! The trait is implemented by storage backends (e.g. `kin-store-sqlite`).
//! Higher layers go through [`crate::Session`], which stages writes and hands
//! them to [`Store::commit`] as one batch.

use std::{
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use crate::{entity::Entity, query::Query, value::Value};

// ─── Changes ─────────────────────────────────────────────────────────────────

/// A staged write, described with column names and values only.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
  Insert {
    table:   &'static str,
    columns: Vec<&'static str>,
    values:  Vec<Value>,
    /// Key values, used to match a later removal against this insert.
    key:     Vec<Value>,
  },
  /// Full-value overwrite of every non-key column.
  Update {
    table:       &'static str,
    columns:     Vec<&'static str>,
    values:      Vec<Value>,
    key_columns: &'static [&'static str],
    key:         Vec<Value>,
  },
  Delete {
    table:       &'static str,
    key_columns: &'static [&'static str],
    key:         Vec<Value>,
  },
}

impl Change {
  /// Stage an insert of `entity`. An identity column holding `0` is left out
  /// so the store assigns it.
  pub fn insert<E: Entity>(entity: &E) -> Self {
    let (columns, values) = E::COLUMNS
      .iter()
      .zip(entity.to_values())
      .filter(|(column, value)| {
        !(E::IDENTITY == Some(column.name) && *value == Value::Integer(0))
      })
      .map(|(column, value)| (column.name, value))
      .unzip();
    Self::Insert {
      table: E::TABLE,
      columns,
      values,
      key: E::key_values(&entity.key()),
    }
  }

  pub fn update<E: Entity>(entity: &E) -> Self {
    let (columns, values) = E::COLUMNS
      .iter()
      .zip(entity.to_values())
      .filter(|(column, _)| !E::KEY_COLUMNS.contains(&column.name))
      .map(|(column, value)| (column.name, value))
      .unzip();
    Self::Update {
      table: E::TABLE,
      columns,
      values,
      key_columns: E::KEY_COLUMNS,
      key: E::key_values(&entity.key()),
    }
  }

  pub fn delete<E: Entity>(entity: &E) -> Self {
    Self::Delete {
      table:       E::TABLE,
      key_columns: E::KEY_COLUMNS,
      key:         E::key_values(&entity.key()),
    }
  }

  pub fn table(&self) -> &'static str {
    match self {
      Self::Insert { table, .. }
      | Self::Update { table, .. }
      | Self::Delete { table, .. } => table,
    }
  }

  pub fn is_insert_of(&self, table: &str, key: &[Value]) -> bool {
    matches!(self, Self::Insert { table: t, key: k, .. } if *t == table && k == key)
  }
}

// ─── Cancellation ────────────────────────────────────────────────────────────

/// Cooperative cancellation for an in-flight commit.
///
/// Backends check the token between statements; once it is set the open
/// transaction is rolled back and the commit fails as cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
  pub fn new() -> Self { Self::default() }

  pub fn cancel(&self) { self.0.store(true, Ordering::SeqCst); }

  pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a kin storage backend.
///
/// A store is a handle to one underlying connection. Operations on a handle
/// are not meant to overlap; concurrent tasks each build their own
/// [`crate::Session`] over a clone of the store.
pub trait Store: Send + Sync {
  type Error: std::error::Error + From<crate::Error> + Send + Sync + 'static;

  /// Fetch every row of `E` matching `query`, with the requested relations
  /// hydrated. Unknown columns or relations are rejected before any row is
  /// read.
  fn fetch<E: Entity>(
    &self,
    query: Query,
  ) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + '_;

  /// Apply `changes` in order inside a single transaction and return the
  /// number of rows written. Either every change becomes durable or none
  /// does.
  fn commit(
    &self,
    changes: Vec<Change>,
    cancel: CancelToken,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
