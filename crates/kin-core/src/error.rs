//! Error types for `kin-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("table {table:?} has no column {column:?}")]
  UnknownColumn { table: &'static str, column: String },

  #[error("table {table:?} has no relation {relation:?}")]
  UnknownRelation { table: &'static str, relation: String },

  #[error("cannot decode {table}.{column}: {reason}")]
  Decode {
    table:  &'static str,
    column: &'static str,
    reason: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
