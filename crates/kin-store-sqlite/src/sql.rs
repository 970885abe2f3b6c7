//! SQL text generation from entity metadata.
//!
//! Identifiers always come from static [`Entity`] metadata (caller-supplied
//! names are first resolved against it), and every value is bound as a
//! parameter.

use kin_core::{
  entity::Entity,
  query::{Filter, Query},
  store::Change,
  value::Value,
};
use rusqlite::types::Value as SqlValue;

use crate::{Result, encode::encode_value};

pub struct Statement {
  pub sql:    String,
  pub params: Vec<SqlValue>,
}

fn ident(name: &str) -> String { format!("\"{name}\"") }

fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

// ─── SELECT ──────────────────────────────────────────────────────────────────

pub fn select<E: Entity>(query: &Query) -> Result<Statement> {
  let columns = E::COLUMNS
    .iter()
    .map(|c| ident(c.name))
    .collect::<Vec<_>>()
    .join(", ");
  let mut sql = format!("SELECT {columns} FROM {}", ident(E::TABLE));
  let mut params = Vec::new();

  if let Some(filter) = &query.filter {
    sql.push_str(" WHERE ");
    push_filter::<E>(filter, &mut sql, &mut params)?;
  }

  if !query.order.is_empty() {
    let terms = query
      .order
      .iter()
      .map(|o| -> Result<String> {
        let column = E::column(&o.column)?;
        let direction = if o.descending { "DESC" } else { "ASC" };
        Ok(format!("{} {direction}", ident(column.name)))
      })
      .collect::<Result<Vec<_>>>()?;
    sql.push_str(" ORDER BY ");
    sql.push_str(&terms.join(", "));
  }

  if let Some(limit) = query.limit {
    sql.push_str(" LIMIT ?");
    params.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
  }

  Ok(Statement { sql, params })
}

fn push_filter<E: Entity>(
  filter: &Filter,
  sql: &mut String,
  params: &mut Vec<SqlValue>,
) -> Result<()> {
  match filter {
    Filter::Eq(column, Value::Null) => {
      sql.push_str(&format!("{} IS NULL", ident(E::column(column)?.name)));
    }
    Filter::Eq(column, value) => {
      sql.push_str(&format!("{} = ?", ident(E::column(column)?.name)));
      params.push(encode_value(value));
    }
    // `IS NOT` so rows holding NULL still count as "not equal".
    Filter::Ne(column, value) => {
      sql.push_str(&format!("{} IS NOT ?", ident(E::column(column)?.name)));
      params.push(encode_value(value));
    }
    Filter::In(column, values) => {
      let column = ident(E::column(column)?.name);
      if values.is_empty() {
        sql.push('0');
      } else {
        sql.push_str(&format!("{column} IN ({})", placeholders(values.len())));
        params.extend(values.iter().map(encode_value));
      }
    }
    Filter::And(parts) => push_group::<E>(parts, " AND ", "1", sql, params)?,
    Filter::Or(parts) => push_group::<E>(parts, " OR ", "0", sql, params)?,
  }
  Ok(())
}

fn push_group<E: Entity>(
  parts: &[Filter],
  joiner: &str,
  empty: &str,
  sql: &mut String,
  params: &mut Vec<SqlValue>,
) -> Result<()> {
  if parts.is_empty() {
    sql.push_str(empty);
    return Ok(());
  }
  for (i, part) in parts.iter().enumerate() {
    if i > 0 {
      sql.push_str(joiner);
    }
    sql.push('(');
    push_filter::<E>(part, sql, params)?;
    sql.push(')');
  }
  Ok(())
}

// ─── Writes ──────────────────────────────────────────────────────────────────

fn key_clause(key_columns: &[&str]) -> String {
  key_columns
    .iter()
    .map(|c| format!("{} = ?", ident(c)))
    .collect::<Vec<_>>()
    .join(" AND ")
}

pub fn write(change: &Change) -> Statement {
  match change {
    Change::Insert { table, columns, values, .. } => {
      let sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", ident(table))
      } else {
        format!(
          "INSERT INTO {} ({}) VALUES ({})",
          ident(table),
          columns.iter().map(|c| ident(c)).collect::<Vec<_>>().join(", "),
          placeholders(values.len()),
        )
      };
      Statement { sql, params: values.iter().map(encode_value).collect() }
    }
    Change::Update { table, columns, values, key_columns, key } => {
      let assignments = columns
        .iter()
        .map(|c| format!("{} = ?", ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
      Statement {
        sql:    format!(
          "UPDATE {} SET {assignments} WHERE {}",
          ident(table),
          key_clause(key_columns),
        ),
        params: values.iter().chain(key).map(encode_value).collect(),
      }
    }
    Change::Delete { table, key_columns, key } => Statement {
      sql:    format!(
        "DELETE FROM {} WHERE {}",
        ident(table),
        key_clause(key_columns),
      ),
      params: key.iter().map(encode_value).collect(),
    },
  }
}
