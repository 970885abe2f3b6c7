//! Error type for `kin-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] kin_core::Error),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  /// A constraint violation (duplicate key, restricted delete, check) or an
  /// unexpected affected-row count on save.
  #[error("persistence conflict: {0}")]
  Conflict(String),

  #[error("save cancelled")]
  Cancelled,

  #[error("invalid connection configuration: {0}")]
  Config(String),
}

impl Error {
  pub fn is_conflict(&self) -> bool { matches!(self, Self::Conflict(_)) }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    match &e {
      rusqlite::Error::SqliteFailure(failure, _)
        if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Self::Conflict(e.to_string())
      }
      _ => Self::Database(tokio_rusqlite::Error::Rusqlite(e)),
    }
  }
}

/// Errors raised inside a connection call travel back boxed in
/// `tokio_rusqlite::Error::Other`; unbox them here so callers see the
/// original variant.
impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(e) => e.into(),
      tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
        Ok(e) => *e,
        Err(inner) => Self::Database(tokio_rusqlite::Error::Other(inner)),
      },
      other => Self::Database(other),
    }
  }
}

/// Box `e` for the trip out of a `tokio_rusqlite` call closure.
pub(crate) fn into_call(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
