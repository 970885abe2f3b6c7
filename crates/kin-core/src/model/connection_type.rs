use serde::{Deserialize, Serialize};

use crate::{
  Result,
  entity::{Entity, Related},
  value::{Column, Row, Value},
};

/// Describes one side of a member connection, e.g. "parent" or "child".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionType {
  pub id:   i32,
  pub name: String,
  /// Directional framing flag; distinguishes e.g. parent-side from
  /// child-side wording.
  #[serde(rename = "type")]
  pub kind: bool,
}

impl Entity for ConnectionType {
  type Key = i32;

  const TABLE: &'static str = "connectiontype";
  const COLUMNS: &'static [Column] = &[
    Column::integer("ID"),
    Column::text("Name"),
    Column::boolean("Type"),
  ];
  const KEY_COLUMNS: &'static [&'static str] = &["ID"];
  const IDENTITY: Option<&'static str> = Some("ID");

  fn key(&self) -> i32 { self.id }

  fn key_values(key: &i32) -> Vec<Value> { vec![(*key).into()] }

  fn to_values(&self) -> Vec<Value> {
    vec![self.id.into(), self.name.as_str().into(), self.kind.into()]
  }

  fn from_row(row: &mut Row) -> Result<Self> {
    Ok(Self { id: row.int()?, name: row.text()?, kind: row.boolean()? })
  }

  fn into_related(self) -> Option<Related> {
    Some(Related::ConnectionType(self))
  }
}
