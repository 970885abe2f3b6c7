//! Back-reference views over fetched rows.
//!
//! Models only point "up" through their foreign keys. The reverse direction
//! (which families a member created, which connections name a member on
//! either side, …) is computed here as plain maps keyed by the foreign key.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{
  Family, FamilyConnection, FamilyConnectionKey, FamilyId, Member,
  MemberConnection, MemberConnectionKey, UserId,
};

#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
  creator_of_families: BTreeMap<UserId, Vec<FamilyId>>,
  /// Connections where the member is the first endpoint (`UserID`).
  connections_as_user: BTreeMap<UserId, Vec<MemberConnectionKey>>,
  /// Connections where the member is the second endpoint (`User2ID`).
  connections_as_user2: BTreeMap<UserId, Vec<MemberConnectionKey>>,
  memberships_by_member: BTreeMap<UserId, Vec<FamilyConnectionKey>>,
  memberships_by_family: BTreeMap<FamilyId, Vec<FamilyConnectionKey>>,
  member_by_sex: BTreeMap<i32, UserId>,
}

/// Everything that refers to one member, as returned by
/// [`RelationIndex::member`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemberRelations {
  pub created_families:     Vec<FamilyId>,
  pub connections_as_user:  Vec<MemberConnectionKey>,
  pub connections_as_user2: Vec<MemberConnectionKey>,
  pub family_memberships:   Vec<FamilyConnectionKey>,
}

impl RelationIndex {
  pub fn build(
    members: &[Member],
    families: &[Family],
    member_connections: &[MemberConnection],
    family_connections: &[FamilyConnection],
  ) -> Self {
    let mut index = Self::default();

    for member in members {
      if let Some(sex_id) = member.sex_id {
        index.member_by_sex.insert(sex_id, member.user_id);
      }
    }
    for family in families {
      index
        .creator_of_families
        .entry(family.creator_id)
        .or_default()
        .push(family.id);
    }
    for mc in member_connections {
      let key = (mc.user_id, mc.user2_id);
      index.connections_as_user.entry(mc.user_id).or_default().push(key);
      index.connections_as_user2.entry(mc.user2_id).or_default().push(key);
    }
    for fc in family_connections {
      let key = (fc.user_id, fc.family_id);
      index.memberships_by_member.entry(fc.user_id).or_default().push(key);
      index.memberships_by_family.entry(fc.family_id).or_default().push(key);
    }

    index
  }

  pub fn families_created_by(&self, user_id: UserId) -> &[FamilyId] {
    slice(&self.creator_of_families, &user_id)
  }

  pub fn connections_as_user(&self, user_id: UserId) -> &[MemberConnectionKey] {
    slice(&self.connections_as_user, &user_id)
  }

  pub fn connections_as_user2(
    &self,
    user_id: UserId,
  ) -> &[MemberConnectionKey] {
    slice(&self.connections_as_user2, &user_id)
  }

  pub fn memberships_of(&self, user_id: UserId) -> &[FamilyConnectionKey] {
    slice(&self.memberships_by_member, &user_id)
  }

  pub fn members_of(&self, family_id: FamilyId) -> &[FamilyConnectionKey] {
    slice(&self.memberships_by_family, &family_id)
  }

  /// The member holding `sex_id`; the link is one-to-one.
  pub fn member_with_sex(&self, sex_id: i32) -> Option<UserId> {
    self.member_by_sex.get(&sex_id).copied()
  }

  pub fn member(&self, user_id: UserId) -> MemberRelations {
    MemberRelations {
      created_families:     self.families_created_by(user_id).to_vec(),
      connections_as_user:  self.connections_as_user(user_id).to_vec(),
      connections_as_user2: self.connections_as_user2(user_id).to_vec(),
      family_memberships:   self.memberships_of(user_id).to_vec(),
    }
  }
}

fn slice<'a, K: Ord, V>(map: &'a BTreeMap<K, Vec<V>>, key: &K) -> &'a [V] {
  map.get(key).map(Vec::as_slice).unwrap_or_default()
}
