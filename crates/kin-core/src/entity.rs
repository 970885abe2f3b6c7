//! The [`Entity`] trait: table metadata plus row mapping for one model.
//!
//! Backends never see concrete model types. They build SQL from the static
//! metadata, decode rows through [`Entity::from_row`], and hydrate navigation
//! properties through [`Entity::attach`].

use std::fmt::Debug;

use crate::{
  Error, Result,
  model::{ConnectionType, Family, Member, Sex},
  query::Filter,
  value::{Column, Row, Value},
};

// ─── Relations ───────────────────────────────────────────────────────────────

/// The entity types that can be the target of a navigation property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationTarget {
  Member,
  Sex,
  ConnectionType,
  Family,
}

impl RelationTarget {
  pub fn table(self) -> &'static str {
    match self {
      Self::Member => Member::TABLE,
      Self::Sex => Sex::TABLE,
      Self::ConnectionType => ConnectionType::TABLE,
      Self::Family => Family::TABLE,
    }
  }

  /// Relations declared by the target entity, for nested include paths.
  pub fn relations(self) -> &'static [Relation] {
    match self {
      Self::Member => Member::RELATIONS,
      Self::Sex => Sex::RELATIONS,
      Self::ConnectionType => ConnectionType::RELATIONS,
      Self::Family => Family::RELATIONS,
    }
  }
}

/// A many-to-one navigation property, resolved through a foreign key column
/// on the owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
  /// Name used in include paths, e.g. `"User"` or `"ConnectionType2"`.
  pub name:        &'static str,
  pub foreign_key: &'static str,
  pub target:      RelationTarget,
}

/// A hydrated related entity handed to [`Entity::attach`].
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
  Member(Member),
  Sex(Sex),
  ConnectionType(ConnectionType),
  Family(Family),
}

pub(crate) fn find_relation(
  table: &'static str,
  relations: &'static [Relation],
  name: &str,
) -> Result<&'static Relation> {
  relations
    .iter()
    .find(|r| r.name == name)
    .ok_or_else(|| Error::UnknownRelation { table, relation: name.to_owned() })
}

// ─── Trait ───────────────────────────────────────────────────────────────────

pub trait Entity: Clone + Debug + Send + Sync + Sized + 'static {
  type Key: Clone + Debug + PartialEq + Send + Sync + 'static;

  const TABLE: &'static str;
  /// Every mapped column, in the order of [`Entity::to_values`].
  const COLUMNS: &'static [Column];
  const KEY_COLUMNS: &'static [&'static str];
  /// Integer key column assigned by the store when an insert carries `0`.
  const IDENTITY: Option<&'static str> = None;
  const RELATIONS: &'static [Relation] = &[];

  fn key(&self) -> Self::Key;

  /// Key values in [`Entity::KEY_COLUMNS`] order.
  fn key_values(key: &Self::Key) -> Vec<Value>;

  fn to_values(&self) -> Vec<Value>;

  fn from_row(row: &mut Row) -> Result<Self>;

  /// Store a hydrated navigation property.
  fn attach(&mut self, relation: &Relation, related: Related) -> Result<()> {
    let _ = related;
    Err(Error::UnknownRelation {
      table:    Self::TABLE,
      relation: relation.name.to_owned(),
    })
  }

  /// Wrap `self` for attachment to another entity, if it is a relation
  /// target.
  fn into_related(self) -> Option<Related> { None }

  // ── Provided ──────────────────────────────────────────────────────────

  fn column(name: &str) -> Result<&'static Column> {
    Self::COLUMNS
      .iter()
      .find(|c| c.name == name)
      .ok_or_else(|| Error::UnknownColumn {
        table:  Self::TABLE,
        column: name.to_owned(),
      })
  }

  fn relation(name: &str) -> Result<&'static Relation> {
    find_relation(Self::TABLE, Self::RELATIONS, name)
  }

  /// Filter matching exactly the row with `key`.
  fn key_filter(key: &Self::Key) -> Filter {
    Filter::And(
      Self::KEY_COLUMNS
        .iter()
        .zip(Self::key_values(key))
        .map(|(column, value)| Filter::Eq((*column).to_owned(), value))
        .collect(),
    )
  }

  /// The value of `relation`'s foreign key on this row, or `None` when the
  /// column is null. Entities declaring [`Entity::RELATIONS`] read the field
  /// directly.
  fn foreign_key(&self, relation: &Relation) -> Option<i64> {
    let _ = relation;
    None
  }

  /// The single integer key of this row; `None` for composite keys.
  fn row_id(&self) -> Option<i64> {
    match Self::key_values(&self.key()).as_slice() {
      [Value::Integer(id)] => Some(*id),
      _ => None,
    }
  }
}
