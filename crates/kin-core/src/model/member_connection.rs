use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  entity::{Entity, Related, Relation, RelationTarget},
  model::{ConnectionType, Member, UserId},
  value::{Column, Row, Value},
};

/// `(UserID, User2ID)`.
pub type MemberConnectionKey = (UserId, UserId);

/// A typed edge between two distinct members.
///
/// `connection_type_id` is the role of `user` relative to `user2`, and
/// `connection_type2_id` the role of `user2` relative to `user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberConnection {
  pub user_id:             UserId,
  pub connection_type_id:  i32,
  pub user2_id:            UserId,
  pub connection_type2_id: i32,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user:             Option<Member>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub connection_type:  Option<ConnectionType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user2:            Option<Member>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub connection_type2: Option<ConnectionType>,
}

impl MemberConnection {
  pub fn new(
    user_id: UserId,
    connection_type_id: i32,
    user2_id: UserId,
    connection_type2_id: i32,
  ) -> Self {
    Self {
      user_id,
      connection_type_id,
      user2_id,
      connection_type2_id,
      ..Default::default()
    }
  }

  /// Whether either endpoint is `user_id`.
  pub fn touches(&self, user_id: UserId) -> bool {
    self.user_id == user_id || self.user2_id == user_id
  }
}

impl Entity for MemberConnection {
  type Key = MemberConnectionKey;

  const TABLE: &'static str = "memberconnection";
  const COLUMNS: &'static [Column] = &[
    Column::integer("UserID"),
    Column::integer("ConnectionTypeID"),
    Column::integer("User2ID"),
    Column::integer("ConnectionType2ID"),
  ];
  const KEY_COLUMNS: &'static [&'static str] = &["UserID", "User2ID"];
  const RELATIONS: &'static [Relation] = &[
    Relation {
      name:        "User",
      foreign_key: "UserID",
      target:      RelationTarget::Member,
    },
    Relation {
      name:        "ConnectionType",
      foreign_key: "ConnectionTypeID",
      target:      RelationTarget::ConnectionType,
    },
    Relation {
      name:        "User2",
      foreign_key: "User2ID",
      target:      RelationTarget::Member,
    },
    Relation {
      name:        "ConnectionType2",
      foreign_key: "ConnectionType2ID",
      target:      RelationTarget::ConnectionType,
    },
  ];

  fn key(&self) -> MemberConnectionKey { (self.user_id, self.user2_id) }

  fn key_values(key: &MemberConnectionKey) -> Vec<Value> {
    vec![key.0.into(), key.1.into()]
  }

  fn to_values(&self) -> Vec<Value> {
    vec![
      self.user_id.into(),
      self.connection_type_id.into(),
      self.user2_id.into(),
      self.connection_type2_id.into(),
    ]
  }

  fn from_row(row: &mut Row) -> Result<Self> {
    Ok(Self::new(row.int()?, row.int()?, row.int()?, row.int()?))
  }

  fn foreign_key(&self, relation: &Relation) -> Option<i64> {
    let id = match relation.foreign_key {
      "UserID" => self.user_id,
      "ConnectionTypeID" => self.connection_type_id,
      "User2ID" => self.user2_id,
      "ConnectionType2ID" => self.connection_type2_id,
      _ => return None,
    };
    Some(id.into())
  }

  fn attach(&mut self, relation: &Relation, related: Related) -> Result<()> {
    match (relation.name, related) {
      ("User", Related::Member(m)) => self.user = Some(m),
      ("User2", Related::Member(m)) => self.user2 = Some(m),
      ("ConnectionType", Related::ConnectionType(t)) => {
        self.connection_type = Some(t)
      }
      ("ConnectionType2", Related::ConnectionType(t)) => {
        self.connection_type2 = Some(t)
      }
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
