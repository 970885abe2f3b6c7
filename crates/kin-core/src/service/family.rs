use crate::{
  Session,
  model::{Family, FamilyId},
  query::{Filter, Query},
  store::Store,
};

pub struct FamilyService<'s, S> {
  session: &'s Session<S>,
}

impl<'s, S: Store> FamilyService<'s, S> {
  pub fn new(session: &'s Session<S>) -> Self { Self { session } }

  pub async fn get_all(&self) -> Result<Vec<Family>, S::Error> {
    self.session.families().all().await
  }

  /// Look up one family. Ids `<= 0` never reach the store and yield an
  /// empty default family.
  pub async fn get(&self, id: FamilyId) -> Result<Option<Family>, S::Error> {
    if id <= 0 {
      return Ok(Some(Family::default()));
    }
    self
      .session
      .families()
      .first_or_default(Query::new().filter(Filter::eq("ID", id)))
      .await
  }
}
