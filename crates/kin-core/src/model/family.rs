use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  entity::{Entity, Related, Relation, RelationTarget},
  handle::GuildId,
  model::{FamilyId, Member, UserId},
  value::{Column, Row, Value},
};

/// A named group inside a Discord guild, created by one member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
  pub id:         FamilyId,
  pub name:       String,
  pub creator_id: UserId,
  pub guild_id:   GuildId,
  pub storage:    Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub creator: Option<Member>,
}

impl Family {
  /// The name as shown to users: `"Smith"` becomes `"Smith family"`, while
  /// names already containing `"family"` anywhere are left alone.
  pub fn display_name(&self) -> String {
    if self.name.contains("family") {
      self.name.clone()
    } else {
      format!("{} family", self.name)
    }
  }
}

impl Entity for Family {
  type Key = FamilyId;

  const TABLE: &'static str = "family";
  const COLUMNS: &'static [Column] = &[
    Column::integer("ID"),
    Column::text("Name"),
    Column::integer("CreatorID"),
    Column::integer("guildID"),
    Column::text("Storage").nullable(),
  ];
  const KEY_COLUMNS: &'static [&'static str] = &["ID"];
  const IDENTITY: Option<&'static str> = Some("ID");
  const RELATIONS: &'static [Relation] = &[Relation {
    name:        "Creator",
    foreign_key: "CreatorID",
    target:      RelationTarget::Member,
  }];

  fn key(&self) -> FamilyId { self.id }

  fn key_values(key: &FamilyId) -> Vec<Value> { vec![(*key).into()] }

  fn to_values(&self) -> Vec<Value> {
    vec![
      self.id.into(),
      self.name.as_str().into(),
      self.creator_id.into(),
      self.guild_id.to_stored().into(),
      self.storage.clone().into(),
    ]
  }

  fn from_row(row: &mut Row) -> Result<Self> {
    Ok(Self {
      id:         row.int()?,
      name:       row.text()?,
      creator_id: row.int()?,
      guild_id:   GuildId::from_stored(row.big_int()?),
      storage:    row.opt_text()?,
      creator:    None,
    })
  }

  fn attach(&mut self, relation: &Relation, related: Related) -> Result<()> {
    match (relation.name, related) {
      ("Creator", Related::Member(member)) => self.creator = Some(member),
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
      "CreatorID" => Some(self.creator_id.into()),
      _ => None,
    }
  }

  fn into_related(self) -> Option<Related> { Some(Related::Family(self)) }
}
