//! Column values and column metadata.
//!
//! [`Value`] is the backend-neutral cell type exchanged between entities and
//! storage backends. [`Row`] walks a decoded row in column order and produces
//! typed fields with errors that name the offending column.

use std::vec;

use crate::{Error, Result};

// ─── Value ───────────────────────────────────────────────────────────────────

/// A single column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
  Null,
  Integer(i64),
  Bool(bool),
  Text(String),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  pub fn as_integer(&self) -> Option<i64> {
    match self {
      Self::Integer(n) => Some(*n),
      _ => None,
    }
  }

  fn describe(&self) -> &'static str {
    match self {
      Self::Null => "null",
      Self::Integer(_) => "integer",
      Self::Bool(_) => "boolean",
      Self::Text(_) => "text",
    }
  }
}

impl From<i32> for Value {
  fn from(n: i32) -> Self { Self::Integer(n.into()) }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self { Self::Integer(n) }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self { Self::Bool(b) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

// ─── Column metadata ─────────────────────────────────────────────────────────

/// Storage class of a column as seen by the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Integer,
  /// Stored as a tiny integer; surfaces as [`Value::Bool`] when the backend
  /// coerces tiny integers to booleans.
  Boolean,
  Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub name:     &'static str,
  pub ty:       ColumnType,
  pub nullable: bool,
}

impl Column {
  pub const fn integer(name: &'static str) -> Self {
    Self { name, ty: ColumnType::Integer, nullable: false }
  }

  pub const fn boolean(name: &'static str) -> Self {
    Self { name, ty: ColumnType::Boolean, nullable: false }
  }

  pub const fn text(name: &'static str) -> Self {
    Self { name, ty: ColumnType::Text, nullable: false }
  }

  pub const fn nullable(self) -> Self { Self { nullable: true, ..self } }
}

// ─── Row decoding ────────────────────────────────────────────────────────────

/// A fetched row, consumed field by field in column order.
pub struct Row {
  table:   &'static str,
  columns: &'static [Column],
  values:  vec::IntoIter<Value>,
  index:   usize,
}

impl Row {
  pub fn new(
    table: &'static str,
    columns: &'static [Column],
    values: Vec<Value>,
  ) -> Self {
    Self { table, columns, values: values.into_iter(), index: 0 }
  }

  fn next(&mut self) -> Result<(&'static str, Value)> {
    let column = self.columns.get(self.index).map_or("?", |c| c.name);
    self.index += 1;
    match self.values.next() {
      Some(value) => Ok((column, value)),
      None => Err(Error::Decode {
        table: self.table,
        column,
        reason: "row has fewer values than columns".into(),
      }),
    }
  }

  fn mismatch(&self, column: &'static str, want: &str, got: &Value) -> Error {
    Error::Decode {
      table:  self.table,
      column,
      reason: format!("expected {want}, found {}", got.describe()),
    }
  }

  pub fn big_int(&mut self) -> Result<i64> {
    match self.next()? {
      (_, Value::Integer(n)) => Ok(n),
      (column, other) => Err(self.mismatch(column, "integer", &other)),
    }
  }

  pub fn int(&mut self) -> Result<i32> {
    match self.next()? {
      (column, Value::Integer(n)) => {
        i32::try_from(n).map_err(|_| Error::Decode {
          table:  self.table,
          column,
          reason: format!("{n} does not fit in a 32-bit id"),
        })
      }
      (column, other) => Err(self.mismatch(column, "integer", &other)),
    }
  }

  pub fn opt_int(&mut self) -> Result<Option<i32>> {
    match self.next()? {
      (_, Value::Null) => Ok(None),
      (column, Value::Integer(n)) => i32::try_from(n)
        .map(Some)
        .map_err(|_| Error::Decode {
          table:  self.table,
          column,
          reason: format!("{n} does not fit in a 32-bit id"),
        }),
      (column, other) => Err(self.mismatch(column, "integer", &other)),
    }
  }

  pub fn boolean(&mut self) -> Result<bool> {
    match self.next()? {
      (_, Value::Bool(b)) => Ok(b),
      (column, other) => Err(self.mismatch(column, "boolean", &other)),
    }
  }

  pub fn text(&mut self) -> Result<String> {
    match self.next()? {
      (_, Value::Text(s)) => Ok(s),
      (column, other) => Err(self.mismatch(column, "text", &other)),
    }
  }

  pub fn opt_text(&mut self) -> Result<Option<String>> {
    match self.next()? {
      (_, Value::Null) => Ok(None),
      (_, Value::Text(s)) => Ok(Some(s)),
      (column, other) => Err(self.mismatch(column, "text", &other)),
    }
  }
}
