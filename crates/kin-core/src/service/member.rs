use serde::Serialize;

use crate::{
  Session,
  model::{Member, UserId},
  query::{Filter, Query},
  relations::MemberRelations,
  store::Store,
};

/// A member with its sex hydrated and every row that refers to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberProfile {
  pub member:    Member,
  pub relations: MemberRelations,
}

pub struct MemberService<'s, S> {
  session: &'s Session<S>,
}

impl<'s, S: Store> MemberService<'s, S> {
  pub fn new(session: &'s Session<S>) -> Self { Self { session } }

  pub async fn get_with_relations(
    &self,
    user_id: UserId,
  ) -> Result<Option<MemberProfile>, S::Error> {
    let member = self
      .session
      .members()
      .first_or_default(
        Query::new().filter(Filter::eq("UserID", user_id)).include("Sex"),
      )
      .await?;
    let Some(member) = member else {
      return Ok(None);
    };

    let index = self.session.load_relation_index().await?;
    Ok(Some(MemberProfile { relations: index.member(user_id), member }))
  }
}
