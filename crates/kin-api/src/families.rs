//! Handlers for `/families` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/families` | Every family |
//! | `GET`  | `/families/:id` | 404 if not found; ids `<= 0` yield an empty family |
//! | `GET`  | `/families/:id/member-connections` | Empty list for unknown families |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use kin_core::{
  Session,
  model::{Family, FamilyId, MemberConnection},
  service::{FamilyService, MemberConnectionService},
  store::Store,
};
use serde::Serialize;

use crate::error::ApiError;

/// A family as rendered to clients, with its display name resolved.
#[derive(Debug, Serialize)]
pub struct FamilyView {
  #[serde(flatten)]
  pub family:       Family,
  pub display_name: String,
}

impl From<Family> for FamilyView {
  fn from(family: Family) -> Self {
    Self { display_name: family.display_name(), family }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /families`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<FamilyView>>, ApiError>
where
  S: Store + Clone,
{
  let session = Session::new((*store).clone());
  let families = FamilyService::new(&session)
    .get_all()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(families.into_iter().map(FamilyView::from).collect()))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /families/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<FamilyId>,
) -> Result<Json<FamilyView>, ApiError>
where
  S: Store + Clone,
{
  let session = Session::new((*store).clone());
  let family = FamilyService::new(&session)
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("family {id} not found")))?;
  Ok(Json(family.into()))
}

// ─── Member connections ───────────────────────────────────────────────────────

/// `GET /families/:id/member-connections`
pub async fn member_connections<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<FamilyId>,
) -> Result<Json<Vec<MemberConnection>>, ApiError>
where
  S: Store + Clone,
{
  let session = Session::new((*store).clone());
  let connections = MemberConnectionService::new(&session)
    .member_connections_for_family(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(connections))
}
