//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use kin_core::{
  Session,
  handle::{DiscordId, GuildId},
  model::{
    ConnectionType, Family, FamilyConnection, Member, MemberConnection, Sex,
  },
  query::{Filter, Query},
  service::{
    CONNECTION_DETAIL, FamilyService, MemberConnectionService, MemberService,
  },
  store::CancelToken,
};

use crate::{
  ConnectionOptions, DataSource, Error, ProviderOptions, SqliteStore,
  StoreConfig, store::HYDRATION_BATCH,
};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn member(user_id: i32, discord_id: u64) -> Member {
  Member { user_id, discord_id: DiscordId(discord_id), ..Default::default() }
}

fn connection_type(id: i32, name: &str, kind: bool) -> ConnectionType {
  ConnectionType { id, name: name.into(), kind }
}

fn family(id: i32, name: &str, creator_id: i32) -> Family {
  Family {
    id,
    name: name.into(),
    creator_id,
    guild_id: GuildId(900 + id as u64),
    ..Default::default()
  }
}

/// Family 1 ("Smith", created by 10) has members 10 (head) and 11.
/// Family 2 ("Jones family", created by 30) has member 30.
/// Connections: (10, 20), (30, 40), (11, 99).
async fn seeded() -> SqliteStore {
  let store = store().await;
  let session = Session::new(store.clone());

  session.sexes().add_range(&[
    Sex { id: 1, name: "male".into() },
    Sex { id: 2, name: "female".into() },
  ]);
  session.connection_types().add_range(&[
    connection_type(1, "parent", true),
    connection_type(2, "child", false),
    connection_type(3, "sibling", true),
    connection_type(4, "sibling", false),
  ]);
  session.members().add_range(&[
    Member { sex_id: Some(1), ..member(10, 1010) },
    member(11, 1011),
    Member { sex_id: Some(2), ..member(20, 1020) },
    member(30, 1030),
    member(40, 1040),
    member(99, 1099),
  ]);
  session.families().add_range(&[
    family(1, "Smith", 10),
    family(2, "Jones family", 30),
  ]);
  session.family_connections().add_range(&[
    FamilyConnection::new(10, 1, true),
    FamilyConnection::new(11, 1, false),
    FamilyConnection::new(30, 2, true),
  ]);
  session.member_connections().add_range(&[
    MemberConnection::new(10, 1, 20, 2),
    MemberConnection::new(30, 3, 40, 4),
    MemberConnection::new(11, 1, 99, 2),
  ]);

  let written = session.save_changes().await.expect("seed");
  assert_eq!(written, 20);
  store
}

fn keys(connections: &[MemberConnection]) -> HashSet<(i32, i32)> {
  connections.iter().map(|c| (c.user_id, c.user2_id)).collect()
}

// ─── Repository basics ───────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_member() {
  let session = Session::new(store().await);
  session.members().add(&Member {
    storage: Some("{\"nick\":\"al\"}".into()),
    ..member(5, 42)
  });
  session.save_changes().await.unwrap();

  let fetched = session.members().get(5).await.unwrap().unwrap();
  assert_eq!(fetched.discord_id, DiscordId(42));
  assert_eq!(fetched.storage.as_deref(), Some("{\"nick\":\"al\"}"));
  assert_eq!(fetched.sex_id, None);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let session = Session::new(store().await);
  assert!(session.members().get(404).await.unwrap().is_none());
  assert!(session.member_connections().get((1, 2)).await.unwrap().is_none());
}

#[tokio::test]
async fn staged_insert_is_invisible_until_saved() {
  let session = Session::new(store().await);
  session.members().add(&member(1, 1));
  assert_eq!(session.pending_changes(), 1);
  assert!(session.members().get(1).await.unwrap().is_none());

  assert_eq!(session.save_changes().await.unwrap(), 1);
  assert_eq!(session.pending_changes(), 0);
  assert!(session.members().get(1).await.unwrap().is_some());
}

#[tokio::test]
async fn identity_is_assigned_when_zero() {
  let session = Session::new(store().await);
  session.sexes().add(&Sex { id: 0, name: "unspecified".into() });
  session.save_changes().await.unwrap();

  let all = session.sexes().all().await.unwrap();
  assert_eq!(all.len(), 1);
  assert!(all[0].id > 0);
}

#[tokio::test]
async fn max_discord_id_round_trips() {
  let session = Session::new(store().await);
  session.members().add(&member(1, u64::MAX));
  session.save_changes().await.unwrap();

  let fetched = session.members().get(1).await.unwrap().unwrap();
  assert_eq!(fetched.discord_id.0, 18_446_744_073_709_551_615);
}

#[tokio::test]
async fn high_bit_guild_id_round_trips() {
  let session = Session::new(store().await);
  session.members().add(&member(1, 1));
  session.families().add(&Family {
    guild_id: GuildId((1 << 63) + 7),
    ..family(1, "Smith", 1)
  });
  session.save_changes().await.unwrap();

  let fetched = session.families().get(1).await.unwrap().unwrap();
  assert_eq!(fetched.guild_id, GuildId((1 << 63) + 7));
}

#[tokio::test]
async fn query_filters_and_orders() {
  let session = Session::new(seeded().await);

  let heads = session
    .family_connections()
    .query(
      Query::new()
        .filter(Filter::eq("Head", true))
        .order_by_desc("FamilyID"),
    )
    .await
    .unwrap();
  let keys: Vec<_> = heads.iter().map(|fc| (fc.user_id, fc.family_id)).collect();
  assert_eq!(keys, [(30, 2), (10, 1)]);

  let some = session
    .members()
    .query(
      Query::new()
        .filter(Filter::any_of("UserID", [10, 20, 40]).or(Filter::eq("UserID", 99)))
        .order_by("UserID"),
    )
    .await
    .unwrap();
  let ids: Vec<_> = some.iter().map(|m| m.user_id).collect();
  assert_eq!(ids, [10, 20, 40, 99]);
}

#[tokio::test]
async fn null_filters_match_missing_foreign_keys() {
  let session = Session::new(seeded().await);
  let sexless = session
    .members()
    .query(Query::new().filter(Filter::eq("SexID", None::<i32>)))
    .await
    .unwrap();
  assert_eq!(sexless.len(), 4);

  let not_one = session
    .members()
    .query(Query::new().filter(Filter::ne("SexID", 1)))
    .await
    .unwrap();
  assert_eq!(not_one.len(), 5);
}

#[tokio::test]
async fn first_or_default_follows_order() {
  let session = Session::new(seeded().await);
  let last = session
    .members()
    .first_or_default(Query::new().order_by_desc("UserID"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(last.user_id, 99);

  let none = session
    .families()
    .first_or_default(Query::new().filter(Filter::eq("Name", "Nobody")))
    .await
    .unwrap();
  assert!(none.is_none());
}

#[tokio::test]
async fn unknown_column_is_rejected() {
  let session = Session::new(seeded().await);
  let err = session
    .members()
    .query(Query::new().filter(Filter::eq("Nickname", "x")))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(kin_core::Error::UnknownColumn { .. })));
}

// ─── Hydration ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn include_hydrates_nested_relations() {
  let session = Session::new(seeded().await);
  let mc = session
    .member_connections()
    .first_or_default(
      Query::new()
        .filter(Filter::eq("UserID", 10))
        .include(CONNECTION_DETAIL),
    )
    .await
    .unwrap()
    .unwrap();

  let user = mc.user.as_ref().unwrap();
  assert_eq!(user.user_id, 10);
  assert_eq!(user.sex.as_ref().unwrap().name, "male");

  let user2 = mc.user2.as_ref().unwrap();
  assert_eq!(user2.user_id, 20);
  assert_eq!(user2.sex.as_ref().unwrap().name, "female");

  assert_eq!(mc.connection_type.as_ref().unwrap().name, "parent");
  assert!(mc.connection_type.as_ref().unwrap().kind);
  assert_eq!(mc.connection_type2.as_ref().unwrap().name, "child");
  assert!(!mc.connection_type2.as_ref().unwrap().kind);
}

#[tokio::test]
async fn rows_without_include_stay_shallow() {
  let session = Session::new(seeded().await);
  let mc = session.member_connections().get((10, 20)).await.unwrap().unwrap();
  assert!(mc.user.is_none());
  assert!(mc.connection_type.is_none());
}

#[tokio::test]
async fn include_through_family_reaches_creator() {
  let session = Session::new(seeded().await);
  let fc = session
    .family_connections()
    .first_or_default(
      Query::new()
        .filter(Filter::eq("UserID", 11))
        .include("User, Family.Creator.Sex"),
    )
    .await
    .unwrap()
    .unwrap();

  assert_eq!(fc.user.as_ref().unwrap().user_id, 11);
  let family = fc.family.as_ref().unwrap();
  assert_eq!(family.display_name(), "Smith family");
  let creator = family.creator.as_ref().unwrap();
  assert_eq!(creator.user_id, 10);
  assert_eq!(creator.sex.as_ref().unwrap().id, 1);
}

#[tokio::test]
async fn null_foreign_key_leaves_relation_empty() {
  let session = Session::new(seeded().await);
  let m = session
    .members()
    .first_or_default(Query::new().filter(Filter::eq("UserID", 11)).include("Sex"))
    .await
    .unwrap()
    .unwrap();
  assert!(m.sex.is_none());
}

#[tokio::test]
async fn unknown_relation_is_rejected_even_without_rows() {
  let session = Session::new(store().await);
  let err = session
    .member_connections()
    .query(Query::new().include("User.Family"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(kin_core::Error::UnknownRelation { .. })));
}

// ─── Updates and deletes ─────────────────────────────────────────────────────

#[tokio::test]
async fn update_overwrites_full_value() {
  let session = Session::new(seeded().await);
  let mut fc = session.family_connections().get((11, 1)).await.unwrap().unwrap();
  assert!(!fc.head);
  fc.head = true;
  session.family_connections().update(&fc);
  assert_eq!(session.save_changes().await.unwrap(), 1);

  let fetched = session.family_connections().get((11, 1)).await.unwrap().unwrap();
  assert!(fetched.head);
}

#[tokio::test]
async fn update_of_missing_row_conflicts() {
  let session = Session::new(seeded().await);
  session.members().update(&member(555, 1));
  let err = session.save_changes().await.unwrap_err();
  assert!(err.is_conflict(), "{err}");
}

#[tokio::test]
async fn update_of_missing_row_is_counted_without_affected_rows() {
  let store = SqliteStore::open_with(ConnectionOptions {
    data_source: DataSource::Memory,
    provider:    ProviderOptions {
      use_affected_rows: false,
      ..Default::default()
    },
  })
  .await
  .unwrap();
  let session = Session::new(store);
  session.members().update(&member(555, 1));
  assert_eq!(session.save_changes().await.unwrap(), 1);
}

#[tokio::test]
async fn deleting_referenced_member_conflicts() {
  let session = Session::new(seeded().await);
  // 99 is only referenced by the (11, 99) connection.
  assert!(session.members().remove_by_key(99).await.unwrap());
  let err = session.save_changes().await.unwrap_err();
  assert!(err.is_conflict(), "{err}");
  assert!(session.members().get(99).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_after_edge_removed_succeeds() {
  let session = Session::new(seeded().await);
  let mc = session.member_connections().get((11, 99)).await.unwrap().unwrap();
  session.member_connections().remove(&mc);
  session.members().remove(&member(99, 1099));
  assert_eq!(session.save_changes().await.unwrap(), 2);
  assert!(session.members().get(99).await.unwrap().is_none());
}

#[tokio::test]
async fn remove_by_key_of_missing_row_stages_nothing() {
  let session = Session::new(seeded().await);
  assert!(!session.families().remove_by_key(77).await.unwrap());
  assert_eq!(session.pending_changes(), 0);
}

#[tokio::test]
async fn removing_a_staged_insert_drops_it() {
  let session = Session::new(store().await);
  let m = member(1, 1);
  session.members().add(&m);
  session.members().remove(&m);
  assert_eq!(session.pending_changes(), 0);
  assert_eq!(session.save_changes().await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_key_conflicts() {
  let session = Session::new(seeded().await);
  session.family_connections().add(&FamilyConnection::new(10, 1, false));
  let err = session.save_changes().await.unwrap_err();
  assert!(err.is_conflict(), "{err}");
}

#[tokio::test]
async fn sex_belongs_to_one_member() {
  let session = Session::new(seeded().await);
  session.members().add(&Member { sex_id: Some(1), ..member(12, 1012) });
  let err = session.save_changes().await.unwrap_err();
  assert!(err.is_conflict(), "{err}");
}

#[tokio::test]
async fn self_connection_is_rejected() {
  let session = Session::new(seeded().await);
  session.member_connections().add(&MemberConnection::new(10, 1, 10, 2));
  let err = session.save_changes().await.unwrap_err();
  assert!(err.is_conflict(), "{err}");
}

#[tokio::test]
async fn failed_save_is_atomic_and_keeps_changes() {
  let session = Session::new(seeded().await);
  session.members().add(&member(50, 1050));
  session.members().add(&member(10, 1010));
  assert!(session.save_changes().await.unwrap_err().is_conflict());

  assert!(session.members().get(50).await.unwrap().is_none());
  assert_eq!(session.pending_changes(), 2);

  session.discard_changes();
  assert_eq!(session.pending_changes(), 0);
}

#[tokio::test]
async fn cancelled_save_rolls_back() {
  let cancel = CancelToken::new();
  let session = Session::new(store().await).with_cancel_token(cancel.clone());
  session.members().add(&member(1, 1));
  cancel.cancel();

  let err = session.save_changes().await.unwrap_err();
  assert!(matches!(err, Error::Cancelled));
  assert!(session.members().get(1).await.unwrap().is_none());
}

#[tokio::test]
async fn cancelled_token_fails_every_later_save() {
  let cancel = CancelToken::new();
  let store = store().await;
  let session = Session::new(store.clone()).with_cancel_token(cancel.clone());
  cancel.cancel();

  session.members().add(&member(1, 1));
  assert!(matches!(session.save_changes().await, Err(Error::Cancelled)));
  assert!(matches!(session.save_changes().await, Err(Error::Cancelled)));
  assert_eq!(session.pending_changes(), 1);

  // A fresh session over the same store is unaffected.
  let fresh = Session::new(store);
  fresh.members().add(&member(1, 1));
  assert_eq!(fresh.save_changes().await.unwrap(), 1);
}

#[tokio::test]
async fn booleans_need_tiny_as_boolean() {
  let store = SqliteStore::open_with(ConnectionOptions {
    data_source: DataSource::Memory,
    provider:    ProviderOptions {
      treat_tiny_as_boolean: false,
      ..Default::default()
    },
  })
  .await
  .unwrap();
  let session = Session::new(store);
  session.connection_types().add(&connection_type(1, "parent", true));
  session.members().add(&member(1, 1));
  session.save_changes().await.unwrap();

  // No boolean columns: decodes fine.
  assert!(session.members().get(1).await.unwrap().is_some());

  let err = session.connection_types().get(1).await.unwrap_err();
  assert!(matches!(err, Error::Core(kin_core::Error::Decode { column: "Type", .. })));
}

#[tokio::test]
async fn connect_uses_connection_string() {
  let store = SqliteStore::connect(&StoreConfig::new("Data Source=:memory:"))
    .await
    .unwrap();
  assert_eq!(store.options(), ProviderOptions::default());
}

// ─── Family connection query ─────────────────────────────────────────────────

#[tokio::test]
async fn family_connections_keep_either_endpoint() {
  let session = Session::new(seeded().await);
  let result = MemberConnectionService::new(&session)
    .member_connections_for_family(1)
    .await
    .unwrap();

  assert_eq!(keys(&result), HashSet::from([(10, 20), (11, 99)]));
  assert_eq!(result.len(), 2);
  for mc in &result {
    assert!(mc.user.is_some() && mc.user2.is_some());
    assert!(mc.connection_type.is_some() && mc.connection_type2.is_some());
  }
}

#[tokio::test]
async fn unknown_family_yields_empty_result() {
  let session = Session::new(seeded().await);
  let service = MemberConnectionService::new(&session);
  for id in [0, -1, 3, i32::MAX] {
    assert!(service.member_connections_for_family(id).await.unwrap().is_empty());
  }
}

#[tokio::test]
async fn family_without_members_yields_empty_result() {
  let session = Session::new(seeded().await);
  session.families().add(&family(3, "Empty", 40));
  session.save_changes().await.unwrap();

  let result = MemberConnectionService::new(&session)
    .member_connections_for_family(3)
    .await
    .unwrap();
  assert!(result.is_empty());
}

#[tokio::test]
async fn connection_inside_family_appears_once() {
  let session = Session::new(seeded().await);
  session.family_connections().add(&FamilyConnection::new(20, 1, false));
  session.save_changes().await.unwrap();

  let result = MemberConnectionService::new(&session)
    .member_connections_for_family(1)
    .await
    .unwrap();
  let hits = result.iter().filter(|c| (c.user_id, c.user2_id) == (10, 20)).count();
  assert_eq!(hits, 1);
  assert_eq!(result.len(), 2);
}

/// Family 1 = {1}, with member 1 connected to every member `2..=count`.
async fn star(count: i32) -> SqliteStore {
  let store = store().await;
  let session = Session::new(store.clone());
  session.connection_types().add_range(&[
    connection_type(1, "friend", true),
    connection_type(2, "friend", false),
  ]);
  let members: Vec<_> =
    (1..=count).map(|id| member(id, 5000 + id as u64)).collect();
  session.members().add_range(&members);
  session.families().add(&family(1, "Star", 1));
  session.family_connections().add(&FamilyConnection::new(1, 1, true));
  let connections: Vec<_> =
    (2..=count).map(|id| MemberConnection::new(1, 1, id, 2)).collect();
  session.member_connections().add_range(&connections);
  session.save_changes().await.expect("seed");
  store
}

async fn assert_star_resolves(count: i32) {
  let session = Session::new(star(count).await);
  let result = MemberConnectionService::new(&session)
    .member_connections_for_family(1)
    .await
    .unwrap();

  assert_eq!(result.len(), (count - 1) as usize);
  for mc in &result {
    assert_eq!(mc.user.as_ref().unwrap().user_id, 1);
    let user2 = mc.user2.as_ref().unwrap();
    assert_eq!(user2.user_id, mc.user2_id);
    assert_eq!(user2.discord_id, DiscordId(5000 + mc.user2_id as u64));
    assert!(mc.connection_type2.is_some());
  }
}

#[tokio::test]
async fn hydration_spans_several_batches() {
  assert_star_resolves(2 * HYDRATION_BATCH as i32 + 10).await;
}

#[tokio::test]
async fn hydration_exceeds_sqlite_variable_limit() {
  // SQLite rejects statements binding more than 32,766 parameters.
  assert_star_resolves(33_000).await;
}

#[tokio::test]
async fn family_query_is_idempotent() {
  let session = Session::new(seeded().await);
  let service = MemberConnectionService::new(&session);
  let first = service.member_connections_for_family(2).await.unwrap();
  let second = service.member_connections_for_family(2).await.unwrap();
  assert_eq!(keys(&first), keys(&second));
  assert_eq!(keys(&first), HashSet::from([(30, 40)]));
}

#[tokio::test]
async fn family_query_matches_set_definition() {
  let session = Session::new(seeded().await);
  let members: HashSet<i32> = session
    .family_connections()
    .query(Query::new().filter(Filter::eq("FamilyID", 1)))
    .await
    .unwrap()
    .into_iter()
    .map(|fc| fc.user_id)
    .collect();
  let universe = session.member_connections().all().await.unwrap();
  let expected: HashSet<_> = universe
    .iter()
    .filter(|c| members.contains(&c.user_id) || members.contains(&c.user2_id))
    .map(|c| (c.user_id, c.user2_id))
    .collect();

  let result = MemberConnectionService::new(&session)
    .member_connections_for_family(1)
    .await
    .unwrap();
  assert_eq!(keys(&result), expected);
}

// ─── Services ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn family_service_get_all_and_get() {
  let session = Session::new(seeded().await);
  let service = FamilyService::new(&session);

  let all = service.get_all().await.unwrap();
  assert_eq!(all.len(), 2);

  let jones = service.get(2).await.unwrap().unwrap();
  assert_eq!(jones.display_name(), "Jones family");
  assert!(service.get(3).await.unwrap().is_none());
}

#[tokio::test]
async fn family_service_returns_default_for_non_positive_ids() {
  let session = Session::new(seeded().await);
  let service = FamilyService::new(&session);
  assert_eq!(service.get(0).await.unwrap(), Some(Family::default()));
  assert_eq!(service.get(-5).await.unwrap(), Some(Family::default()));
}

#[tokio::test]
async fn member_service_collects_relations() {
  let session = Session::new(seeded().await);
  let profile = MemberService::new(&session)
    .get_with_relations(10)
    .await
    .unwrap()
    .unwrap();

  assert_eq!(profile.member.sex.as_ref().unwrap().name, "male");
  assert_eq!(profile.relations.created_families, [1]);
  assert_eq!(profile.relations.connections_as_user, [(10, 20)]);
  assert!(profile.relations.connections_as_user2.is_empty());
  assert_eq!(profile.relations.family_memberships, [(10, 1)]);

  assert!(
    MemberService::new(&session)
      .get_with_relations(12345)
      .await
      .unwrap()
      .is_none()
  );
}
