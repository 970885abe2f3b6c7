use std::collections::HashSet;

use tracing::debug;

use crate::{
  Session,
  model::{FamilyId, MemberConnection, UserId},
  query::{Filter, Query},
  store::Store,
};

/// Relations hydrated on every connection returned by
/// [`MemberConnectionService::member_connections_for_family`].
pub const CONNECTION_DETAIL: &str =
  "ConnectionType, ConnectionType2, User.Sex, User2.Sex";

pub struct MemberConnectionService<'s, S> {
  session: &'s Session<S>,
}

impl<'s, S: Store> MemberConnectionService<'s, S> {
  pub fn new(session: &'s Session<S>) -> Self { Self { session } }

  /// Every member connection with at least one endpoint in the family,
  /// with both connection types and both members (and their sex) hydrated.
  ///
  /// An unknown family id yields an empty list rather than an error. Rows
  /// come back in fetch order.
  pub async fn member_connections_for_family(
    &self,
    family_id: FamilyId,
  ) -> Result<Vec<MemberConnection>, S::Error> {
    let family = self
      .session
      .families()
      .first_or_default(Query::new().filter(Filter::eq("ID", family_id)))
      .await?;
    let Some(family) = family else {
      debug!(family_id, "no such family");
      return Ok(Vec::new());
    };

    let memberships = self
      .session
      .family_connections()
      .query(
        Query::new()
          .filter(Filter::eq("FamilyID", family.id))
          .include("User"),
      )
      .await?;
    let members: HashSet<UserId> =
      memberships.iter().map(|fc| fc.user_id).collect();

    let universe = self
      .session
      .member_connections()
      .query(Query::new().include(CONNECTION_DETAIL))
      .await?;
    let total = universe.len();

    let connections = connections_touching(&members, universe);
    debug!(
      family_id,
      members = members.len(),
      total,
      kept = connections.len(),
      "resolved family connections"
    );
    Ok(connections)
  }
}

/// Keep the connections with either endpoint in `members`, preserving order.
pub fn connections_touching(
  members: &HashSet<UserId>,
  universe: Vec<MemberConnection>,
) -> Vec<MemberConnection> {
  universe
    .into_iter()
    .filter(|mc| members.contains(&mc.user_id) || members.contains(&mc.user2_id))
    .collect()
}
