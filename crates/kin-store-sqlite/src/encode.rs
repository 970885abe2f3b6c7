//! Encoding and decoding between [`kin_core::value::Value`] and SQLite
//! column values.
//!
//! Booleans are stored as tiny integers. Whether they come back as booleans
//! depends on [`ProviderOptions::treat_tiny_as_boolean`]; with coercion off
//! they surface as plain integers and entities with boolean columns fail to
//! decode.

use kin_core::{
  Error as CoreError,
  entity::Entity,
  value::{Column, ColumnType, Row, Value},
};
use rusqlite::types::Value as SqlValue;

use crate::{ProviderOptions, Result};

pub fn encode_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Integer(n) => SqlValue::Integer(*n),
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Text(s) => SqlValue::Text(s.clone()),
  }
}

pub fn decode_value(
  table: &'static str,
  column: &Column,
  value: SqlValue,
  options: ProviderOptions,
) -> Result<Value> {
  let decoded = match value {
    SqlValue::Null => Value::Null,
    SqlValue::Integer(n)
      if column.ty == ColumnType::Boolean && options.treat_tiny_as_boolean =>
    {
      Value::Bool(n != 0)
    }
    SqlValue::Integer(n) => Value::Integer(n),
    SqlValue::Text(s) => Value::Text(s),
    SqlValue::Blob(bytes) => {
      Value::Text(String::from_utf8(bytes).map_err(|e| CoreError::Decode {
        table,
        column: column.name,
        reason: format!("blob is not UTF-8: {e}"),
      })?)
    }
    SqlValue::Real(f) => {
      return Err(
        CoreError::Decode {
          table,
          column: column.name,
          reason: format!("unexpected real value {f}"),
        }
        .into(),
      );
    }
  };
  Ok(decoded)
}

/// Decode one raw row (in [`Entity::COLUMNS`] order) into `E`.
pub fn decode_row<E: Entity>(
  raw: Vec<SqlValue>,
  options: ProviderOptions,
) -> Result<E> {
  let values = E::COLUMNS
    .iter()
    .zip(raw)
    .map(|(column, value)| decode_value(E::TABLE, column, value, options))
    .collect::<Result<Vec<_>>>()?;
  Ok(E::from_row(&mut Row::new(E::TABLE, E::COLUMNS, values))?)
}
