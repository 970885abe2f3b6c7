//! [`Session`], the unit of work, and the per-entity [`Repository`].
//!
//! Writes are staged on the session and become durable together on
//! [`Session::save_changes`]. Reads always go to the store, so staged rows
//! are not visible until they are saved.

use std::{
  marker::PhantomData,
  sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::debug;

use crate::{
  entity::Entity,
  model::{
    ConnectionType, Family, FamilyConnection, Member, MemberConnection, Sex,
  },
  query::Query,
  relations::RelationIndex,
  store::{CancelToken, Change, Store},
};

// ─── Session ─────────────────────────────────────────────────────────────────

/// One logical unit of work over a store handle.
///
/// A session is meant for a single task; build a fresh one per concurrent
/// request over a clone of the store.
pub struct Session<S> {
  store:   S,
  pending: Mutex<Vec<Change>>,
  cancel:  CancelToken,
}

impl<S: Store> Session<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      pending: Mutex::new(Vec::new()),
      cancel: CancelToken::new(),
    }
  }

  /// Use `cancel` to abort [`Session::save_changes`] from another task.
  ///
  /// Cancellation is permanent: a cancelled token is never reset, so every
  /// later save on this session fails with the store's cancellation error.
  /// Build a new session to continue.
  pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
    self.cancel = cancel;
    self
  }

  pub fn cancel_token(&self) -> &CancelToken { &self.cancel }

  pub fn store(&self) -> &S { &self.store }

  pub fn repository<E: Entity>(&self) -> Repository<'_, S, E> {
    Repository { session: self, entity: PhantomData }
  }

  pub fn members(&self) -> Repository<'_, S, Member> { self.repository() }

  pub fn sexes(&self) -> Repository<'_, S, Sex> { self.repository() }

  pub fn connection_types(&self) -> Repository<'_, S, ConnectionType> {
    self.repository()
  }

  pub fn families(&self) -> Repository<'_, S, Family> { self.repository() }

  pub fn member_connections(&self) -> Repository<'_, S, MemberConnection> {
    self.repository()
  }

  pub fn family_connections(&self) -> Repository<'_, S, FamilyConnection> {
    self.repository()
  }

  /// Number of staged, unsaved changes.
  pub fn pending_changes(&self) -> usize { self.pending().len() }

  pub fn discard_changes(&self) { self.pending().clear(); }

  /// Commit every staged change in one transaction and return the number of
  /// rows written.
  ///
  /// On failure nothing is durable and the staged changes are kept, so the
  /// caller can inspect the error and either retry or discard them. Once the
  /// session's [`CancelToken`] is cancelled every call fails; stage the work
  /// again on a fresh session instead of retrying.
  pub async fn save_changes(&self) -> Result<usize, S::Error> {
    let changes = std::mem::take(&mut *self.pending());
    if changes.is_empty() {
      return Ok(0);
    }

    let staged = changes.len();
    match self.store.commit(changes.clone(), self.cancel.clone()).await {
      Ok(written) => {
        debug!(staged, written, "saved changes");
        Ok(written)
      }
      Err(e) => {
        let mut pending = self.pending();
        let newer = std::mem::replace(&mut *pending, changes);
        pending.extend(newer);
        Err(e)
      }
    }
  }

  /// Read every row needed for the back-reference views of
  /// [`RelationIndex`].
  pub async fn load_relation_index(&self) -> Result<RelationIndex, S::Error> {
    let members = self.members().all().await?;
    let families = self.families().all().await?;
    let member_connections = self.member_connections().all().await?;
    let family_connections = self.family_connections().all().await?;
    Ok(RelationIndex::build(
      &members,
      &families,
      &member_connections,
      &family_connections,
    ))
  }

  fn pending(&self) -> MutexGuard<'_, Vec<Change>> {
    self.pending.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

// ─── Repository ──────────────────────────────────────────────────────────────

/// CRUD facade for one entity type, bound to a [`Session`].
pub struct Repository<'s, S, E> {
  session: &'s Session<S>,
  entity:  PhantomData<fn() -> E>,
}

impl<S: Store, E: Entity> Repository<'_, S, E> {
  /// Stage an insert. The row is visible only after
  /// [`Session::save_changes`].
  pub fn add(&self, entity: &E) {
    self.session.pending().push(Change::insert(entity));
  }

  pub fn add_range(&self, entities: &[E]) {
    self
      .session
      .pending()
      .extend(entities.iter().map(Change::insert));
  }

  /// Look up a row by key. Returns `None` if not found.
  pub async fn get(&self, key: E::Key) -> Result<Option<E>, S::Error> {
    self
      .first_or_default(Query::new().filter(E::key_filter(&key)))
      .await
  }

  pub async fn all(&self) -> Result<Vec<E>, S::Error> {
    self.query(Query::new()).await
  }

  /// Fetch every row matching `query`; an empty vector if none match.
  pub async fn query(&self, query: Query) -> Result<Vec<E>, S::Error> {
    self.session.store.fetch::<E>(query).await
  }

  /// The first row matching `query`, or `None`.
  pub async fn first_or_default(
    &self,
    query: Query,
  ) -> Result<Option<E>, S::Error> {
    let rows = self.session.store.fetch::<E>(query.limit(1)).await?;
    Ok(rows.into_iter().next())
  }

  /// Stage a full-value overwrite of the row with `entity`'s key. Saving
  /// fails if no such row exists.
  pub fn update(&self, entity: &E) {
    self.session.pending().push(Change::update(entity));
  }

  pub fn update_range(&self, entities: &[E]) {
    self
      .session
      .pending()
      .extend(entities.iter().map(Change::update));
  }

  /// Stage a delete. If the entity's insert is still staged in this
  /// session, the insert is dropped instead.
  pub fn remove(&self, entity: &E) {
    let key = E::key_values(&entity.key());
    let mut pending = self.session.pending();
    match pending.iter().position(|c| c.is_insert_of(E::TABLE, &key)) {
      Some(index) => {
        pending.remove(index);
      }
      None => pending.push(Change::delete(entity)),
    }
  }

  pub fn remove_range(&self, entities: &[E]) {
    for entity in entities {
      self.remove(entity);
    }
  }

  /// Look up the row with `key` and stage its delete. Returns `false` when
  /// there is no such row.
  pub async fn remove_by_key(&self, key: E::Key) -> Result<bool, S::Error> {
    match self.get(key).await? {
      Some(entity) => {
        self.remove(&entity);
        Ok(true)
      }
      None => Ok(false),
    }
  }
}
