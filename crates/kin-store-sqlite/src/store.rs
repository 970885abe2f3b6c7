//! [`SqliteStore`]: the SQLite implementation of [`Store`].

use std::{
  collections::{BTreeSet, HashMap},
  path::Path,
};

use kin_core::{
  entity::{Entity, Related, RelationTarget},
  model::{ConnectionType, Family, Member, Sex},
  query::{Filter, Include, Query},
  store::{CancelToken, Change, Store},
};
use rusqlite::types::Value as SqlValue;
use tracing::{debug, info};

use crate::{
  ConnectionOptions, DataSource, Error, ProviderOptions, Result, StoreConfig,
  encode::decode_row,
  error::into_call,
  schema::SCHEMA,
  sql,
};

/// Keys bound per relation-loading query.
pub(crate) const HYDRATION_BATCH: usize = 500;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A kin store backed by a single SQLite database.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one connection thread, so their calls are serialized.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  options: ProviderOptions,
}

impl SqliteStore {
  /// Open the database named by `config`'s connection string.
  pub async fn connect(config: &StoreConfig) -> Result<Self> {
    let options: ConnectionOptions = config.connection_string().parse()?;
    Self::open_with(options).await
  }

  pub async fn open_with(options: ConnectionOptions) -> Result<Self> {
    let conn = match &options.data_source {
      DataSource::Memory => tokio_rusqlite::Connection::open_in_memory().await?,
      DataSource::File(path) => tokio_rusqlite::Connection::open(path).await?,
    };
    info!(
      data_source = ?options.data_source,
      use_affected_rows = options.provider.use_affected_rows,
      treat_tiny_as_boolean = options.provider.treat_tiny_as_boolean,
      "opened store"
    );
    let store = Self { conn, options: options.provider };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open (or create) a store at `path` with default provider options.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(ConnectionOptions {
      data_source: DataSource::File(path.as_ref().to_path_buf()),
      provider:    ProviderOptions::default(),
    })
    .await
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_with(ConnectionOptions::in_memory()).await
  }

  pub fn options(&self) -> ProviderOptions { self.options }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Store impl ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;

  async fn fetch<E: Entity>(&self, query: Query) -> Result<Vec<E>> {
    query.include.validate(E::TABLE, E::RELATIONS)?;
    let options = self.options;

    let rows = self
      .conn
      .call(move |conn| select::<E>(conn, options, &query).map_err(into_call))
      .await?;

    debug!(table = E::TABLE, rows = rows.len(), "fetched");
    Ok(rows)
  }

  async fn commit(
    &self,
    changes: Vec<Change>,
    cancel: CancelToken,
  ) -> Result<usize> {
    let options = self.options;
    let staged = changes.len();

    let written = self
      .conn
      .call(move |conn| apply(conn, options, &changes, &cancel).map_err(into_call))
      .await?;

    debug!(staged, written, "committed");
    Ok(written)
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

fn select<E: Entity>(
  conn: &rusqlite::Connection,
  options: ProviderOptions,
  query: &Query,
) -> Result<Vec<E>> {
  let statement = sql::select::<E>(query)?;
  let width = E::COLUMNS.len();

  let raws: Vec<Vec<SqlValue>> = {
    let mut stmt = conn.prepare(&statement.sql)?;
    stmt
      .query_map(rusqlite::params_from_iter(statement.params.iter()), |row| {
        (0..width)
          .map(|i| row.get::<_, SqlValue>(i))
          .collect::<rusqlite::Result<Vec<_>>>()
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let mut rows = raws
    .into_iter()
    .map(|raw| decode_row::<E>(raw, options))
    .collect::<Result<Vec<_>>>()?;

  hydrate(conn, options, &mut rows, &query.include)?;
  Ok(rows)
}

/// Fill the navigation properties named by `include`, one batched query per
/// relation (and per nesting level).
fn hydrate<E: Entity>(
  conn: &rusqlite::Connection,
  options: ProviderOptions,
  rows: &mut [E],
  include: &Include,
) -> Result<()> {
  for (name, nested) in include.iter() {
    let relation = E::relation(name)?;
    let keys: BTreeSet<i64> =
      rows.iter().filter_map(|row| row.foreign_key(relation)).collect();
    if keys.is_empty() {
      continue;
    }

    let related = match relation.target {
      RelationTarget::Member => load::<Member>(conn, options, keys, nested)?,
      RelationTarget::Sex => load::<Sex>(conn, options, keys, nested)?,
      RelationTarget::ConnectionType => {
        load::<ConnectionType>(conn, options, keys, nested)?
      }
      RelationTarget::Family => load::<Family>(conn, options, keys, nested)?,
    };

    for row in rows.iter_mut() {
      let found = row.foreign_key(relation).and_then(|key| related.get(&key));
      if let Some(found) = found {
        row.attach(relation, found.clone())?;
      }
    }
  }
  Ok(())
}

/// Load the `T` rows with the given keys, `HYDRATION_BATCH` keys per query
/// so the bound parameters stay under SQLite's variable limit.
fn load<T: Entity>(
  conn: &rusqlite::Connection,
  options: ProviderOptions,
  keys: BTreeSet<i64>,
  include: &Include,
) -> Result<HashMap<i64, Related>> {
  let keys: Vec<i64> = keys.into_iter().collect();
  let mut related = HashMap::with_capacity(keys.len());

  for batch in keys.chunks(HYDRATION_BATCH) {
    let query = Query {
      filter: Some(Filter::any_of(T::KEY_COLUMNS[0], batch.iter().copied())),
      include: include.clone(),
      ..Query::default()
    };
    let rows = select::<T>(conn, options, &query)?;
    related.extend(
      rows
        .into_iter()
        .filter_map(|row| Some((row.row_id()?, row.into_related()?))),
    );
  }

  Ok(related)
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Apply `changes` in one transaction. Returning early drops the
/// transaction, which rolls it back.
fn apply(
  conn: &mut rusqlite::Connection,
  options: ProviderOptions,
  changes: &[Change],
  cancel: &CancelToken,
) -> Result<usize> {
  let tx = conn.transaction()?;
  let mut written = 0;

  for change in changes {
    if cancel.is_cancelled() {
      return Err(Error::Cancelled);
    }

    let statement = sql::write(change);
    let affected =
      tx.execute(&statement.sql, rusqlite::params_from_iter(statement.params.iter()))?;

    if !options.use_affected_rows {
      written += 1;
      continue;
    }
    if !matches!(change, Change::Insert { .. }) && affected != 1 {
      return Err(Error::Conflict(format!(
        "expected 1 affected row in {}, found {affected}: {change:?}",
        change.table(),
      )));
    }
    written += affected;
  }

  if cancel.is_cancelled() {
    return Err(Error::Cancelled);
  }
  tx.commit()?;
  Ok(written)
}
