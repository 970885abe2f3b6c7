use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  entity::{Entity, Related, Relation, RelationTarget},
  model::{Family, FamilyId, Member, UserId},
  value::{Column, Row, Value},
};

/// `(UserID, FamilyID)`.
pub type FamilyConnectionKey = (UserId, FamilyId);

/// Membership of a member in a family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyConnection {
  pub user_id:   UserId,
  pub family_id: FamilyId,
  /// Marks the recognised head of the family.
  pub head:      bool,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user:   Option<Member>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub family: Option<Family>,
}

impl FamilyConnection {
  pub fn new(user_id: UserId, family_id: FamilyId, head: bool) -> Self {
    Self { user_id, family_id, head, user: None, family: None }
  }
}

impl Entity for FamilyConnection {
  type Key = FamilyConnectionKey;

  const TABLE: &'static str = "familyconnection";
  const COLUMNS: &'static [Column] = &[
    Column::integer("UserID"),
    Column::integer("FamilyID"),
    Column::boolean("Head"),
  ];
  const KEY_COLUMNS: &'static [&'static str] = &["UserID", "FamilyID"];
  const RELATIONS: &'static [Relation] = &[
    Relation {
      name:        "User",
      foreign_key: "UserID",
      target:      RelationTarget::Member,
    },
    Relation {
      name:        "Family",
      foreign_key: "FamilyID",
      target:      RelationTarget::Family,
    },
  ];

  fn key(&self) -> FamilyConnectionKey { (self.user_id, self.family_id) }

  fn key_values(key: &FamilyConnectionKey) -> Vec<Value> {
    vec![key.0.into(), key.1.into()]
  }

  fn to_values(&self) -> Vec<Value> {
    vec![self.user_id.into(), self.family_id.into(), self.head.into()]
  }

  fn from_row(row: &mut Row) -> Result<Self> {
    Ok(Self::new(row.int()?, row.int()?, row.boolean()?))
  }

  fn foreign_key(&self, relation: &Relation) -> Option<i64> {
    match relation.foreign_key {
      "UserID" => Some(self.user_id.into()),
      "FamilyID" => Some(self.family_id.into()),
      _ => None,
    }
  }

  fn attach(&mut self, relation: &Relation, related: Related) -> Result<()> {
    match (relation.name, related) {
      ("User", Related::Member(m)) => self.user = Some(m),
      ("Family", Related::Family(f)) => self.family = Some(f),
      (name, _) => {
        return Err(Error::UnknownRelation {
          table:    Self::TABLE,
          relation: name.to_owned(),
        });
      }
    }
    Ok(())
  }
}
