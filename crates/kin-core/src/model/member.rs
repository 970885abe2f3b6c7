use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  entity::{Entity, Related, Relation, RelationTarget},
  handle::DiscordId,
  model::{Sex, UserId},
  value::{Column, Row, Value},
};

/// A person, linked to a Discord account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
  pub user_id:    UserId,
  pub discord_id: DiscordId,
  pub sex_id:     Option<i32>,
  /// Opaque payload owned by the caller.
  pub storage:    Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sex: Option<Sex>,
}

impl Entity for Member {
  type Key = UserId;

  const TABLE: &'static str = "member";
  const COLUMNS: &'static [Column] = &[
    Column::integer("UserID"),
    Column::integer("discordID"),
    Column::integer("SexID").nullable(),
    Column::text("Storage").nullable(),
  ];
  const KEY_COLUMNS: &'static [&'static str] = &["UserID"];
  const IDENTITY: Option<&'static str> = Some("UserID");
  const RELATIONS: &'static [Relation] = &[Relation {
    name:        "Sex",
    foreign_key: "SexID",
    target:      RelationTarget::Sex,
  }];

  fn key(&self) -> UserId { self.user_id }

  fn key_values(key: &UserId) -> Vec<Value> { vec![(*key).into()] }

  fn to_values(&self) -> Vec<Value> {
    vec![
      self.user_id.into(),
      self.discord_id.to_stored().into(),
      self.sex_id.into(),
      self.storage.clone().into(),
    ]
  }

  fn from_row(row: &mut Row) -> Result<Self> {
    Ok(Self {
      user_id:    row.int()?,
      discord_id: DiscordId::from_stored(row.big_int()?),
      sex_id:     row.opt_int()?,
      storage:    row.opt_text()?,
      sex:        None,
    })
  }

  fn attach(&mut self, relation: &Relation, related: Related) -> Result<()> {
    match (relation.name, related) {
      ("Sex", Related::Sex(sex)) => self.sex = Some(sex),
      (name, _) => {
        return Err(Error::UnknownRelation {
          table:    Self::TABLE,
          relation: name.to_owned(),
        });
      }
    }
    Ok(())
  }

  fn foreign_key(&self, relation: &Relation) -> Option<i64> {
    match relation.foreign_key {
      "SexID" => self.sex_id.map(i64::from),
      _ => None,
    }
  }

  fn into_related(self) -> Option<Related> { Some(Related::Member(self)) }
}
