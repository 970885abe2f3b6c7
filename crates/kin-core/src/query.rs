//! Query descriptions passed from repositories to store backends.
//!
//! A [`Query`] is a backend-neutral description of a fetch: an optional
//! predicate over columns, the navigation properties to hydrate, an ordering,
//! and an optional row limit. Column and relation names are checked against
//! the entity's metadata by the backend before any SQL is produced.

use std::collections::BTreeMap;

use crate::{
  Result,
  entity::{Relation, find_relation},
  value::Value,
};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// A boolean predicate over an entity's columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
  /// `column = value`; `Value::Null` compares with `IS NULL`.
  Eq(String, Value),
  Ne(String, Value),
  /// `column IN (values…)`; an empty list matches nothing.
  In(String, Vec<Value>),
  /// Every sub-filter must hold; an empty list matches everything.
  And(Vec<Filter>),
  /// Any sub-filter must hold; an empty list matches nothing.
  Or(Vec<Filter>),
}

impl Filter {
  pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
    Self::Eq(column.into(), value.into())
  }

  pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
    Self::Ne(column.into(), value.into())
  }

  pub fn any_of<V: Into<Value>>(
    column: impl Into<String>,
    values: impl IntoIterator<Item = V>,
  ) -> Self {
    Self::In(column.into(), values.into_iter().map(Into::into).collect())
  }

  pub fn and(self, other: Filter) -> Self {
    match self {
      Self::And(mut all) => {
        all.push(other);
        Self::And(all)
      }
      first => Self::And(vec![first, other]),
    }
  }

  pub fn or(self, other: Filter) -> Self {
    match self {
      Self::Or(mut any) => {
        any.push(other);
        Self::Or(any)
      }
      first => Self::Or(vec![first, other]),
    }
  }
}

// ─── Include ─────────────────────────────────────────────────────────────────

/// A tree of navigation properties to hydrate.
///
/// Parsed from a comma-separated list of dotted paths:
/// `"ConnectionType, User.Sex"` hydrates `ConnectionType`, `User`, and the
/// `Sex` of each hydrated `User`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Include {
  children: BTreeMap<String, Include>,
}

impl Include {
  pub fn parse(paths: &str) -> Self {
    let mut include = Self::default();
    include.add(paths);
    include
  }

  /// Merge more comma-separated paths into this tree. Blank segments are
  /// ignored.
  pub fn add(&mut self, paths: &str) {
    for path in paths.split(',').map(str::trim).filter(|p| !p.is_empty()) {
      let mut node = &mut *self;
      for segment in path.split('.').map(str::trim).filter(|s| !s.is_empty()) {
        node = node.children.entry(segment.to_owned()).or_default();
      }
    }
  }

  pub fn is_empty(&self) -> bool { self.children.is_empty() }

  /// Top-level relation names with their nested includes.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &Include)> {
    self.children.iter().map(|(name, nested)| (name.as_str(), nested))
  }

  /// Check every path against the relations reachable from `relations`.
  pub fn validate(
    &self,
    table: &'static str,
    relations: &'static [Relation],
  ) -> Result<()> {
    for (name, nested) in self.iter() {
      let relation = find_relation(table, relations, name)?;
      nested.validate(relation.target.table(), relation.target.relations())?;
    }
    Ok(())
  }
}

impl From<&str> for Include {
  fn from(paths: &str) -> Self { Self::parse(paths) }
}

// ─── Order ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
  pub column:     String,
  pub descending: bool,
}

// ─── Query ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
  pub filter:  Option<Filter>,
  pub include: Include,
  pub order:   Vec<Order>,
  pub limit:   Option<usize>,
}

impl Query {
  pub fn new() -> Self { Self::default() }

  /// Add a predicate; repeated calls are combined with AND.
  pub fn filter(mut self, filter: Filter) -> Self {
    self.filter = Some(match self.filter.take() {
      Some(existing) => existing.and(filter),
      None => filter,
    });
    self
  }

  pub fn include(mut self, paths: &str) -> Self {
    self.include.add(paths);
    self
  }

  pub fn order_by(mut self, column: impl Into<String>) -> Self {
    self.order.push(Order { column: column.into(), descending: false });
    self
  }

  pub fn order_by_desc(mut self, column: impl Into<String>) -> Self {
    self.order.push(Order { column: column.into(), descending: true });
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    Error,
    entity::Entity,
    model::{FamilyConnection, MemberConnection},
  };

  #[test]
  fn parse_builds_nested_tree() {
    let include = Include::parse("ConnectionType, User.Sex,User2.Sex");
    let top: Vec<_> = include.iter().map(|(name, _)| name).collect();
    assert_eq!(top, ["ConnectionType", "User", "User2"]);

    let (_, user) = include.iter().find(|(n, _)| *n == "User").unwrap();
    let nested: Vec<_> = user.iter().map(|(name, _)| name).collect();
    assert_eq!(nested, ["Sex"]);
  }

  #[test]
  fn parse_ignores_blank_segments() {
    let include = Include::parse(" , User,, ");
    assert_eq!(include.iter().count(), 1);
    assert!(Include::parse("").is_empty());
  }

  #[test]
  fn repeated_paths_merge() {
    let mut include = Include::parse("User");
    include.add("User.Sex");
    assert_eq!(include, Include::parse("User.Sex"));
  }

  #[test]
  fn validate_accepts_known_paths() {
    Include::parse("ConnectionType, ConnectionType2, User.Sex, User2.Sex")
      .validate(MemberConnection::TABLE, MemberConnection::RELATIONS)
      .unwrap();
    Include::parse("Family.Creator.Sex")
      .validate(FamilyConnection::TABLE, FamilyConnection::RELATIONS)
      .unwrap();
  }

  #[test]
  fn validate_rejects_unknown_nested_relation() {
    let err = Include::parse("User.Family")
      .validate(MemberConnection::TABLE, MemberConnection::RELATIONS)
      .unwrap_err();
    assert!(
      matches!(err, Error::UnknownRelation { table: "member", ref relation } if relation == "Family")
    );
  }

  #[test]
  fn filters_combine_with_and() {
    let query = Query::new()
      .filter(Filter::eq("UserID", 1))
      .filter(Filter::eq("FamilyID", 2));
    assert_eq!(
      query.filter,
      Some(Filter::And(vec![
        Filter::eq("UserID", 1),
        Filter::eq("FamilyID", 2),
      ]))
    );
  }
}
