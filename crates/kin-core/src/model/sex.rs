use serde::{Deserialize, Serialize};

use crate::{
  Result,
  entity::{Entity, Related},
  value::{Column, Row, Value},
};

/// Lookup row for a member's sex. At most one member refers to each row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sex {
  pub id:   i32,
  pub name: String,
}

impl Entity for Sex {
  type Key = i32;

  const TABLE: &'static str = "sex";
  const COLUMNS: &'static [Column] =
    &[Column::integer("ID"), Column::text("Name")];
  const KEY_COLUMNS: &'static [&'static str] = &["ID"];
  const IDENTITY: Option<&'static str> = Some("ID");

  fn key(&self) -> i32 { self.id }

  fn key_values(key: &i32) -> Vec<Value> { vec![(*key).into()] }

  fn to_values(&self) -> Vec<Value> {
    vec![self.id.into(), self.name.as_str().into()]
  }

  fn from_row(row: &mut Row) -> Result<Self> {
    Ok(Self { id: row.int()?, name: row.text()? })
  }

  fn into_related(self) -> Option<Related> { Some(Related::Sex(self)) }
}
