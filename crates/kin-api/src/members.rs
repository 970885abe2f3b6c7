//! Handlers for `/members` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use kin_core::{
  Session,
  model::UserId,
  service::{MemberProfile, MemberService},
  store::Store,
};

use crate::error::ApiError;

/// `GET /members/:id`: the member, its sex, and every row referring to it.
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<UserId>,
) -> Result<Json<MemberProfile>, ApiError>
where
  S: Store + Clone,
{
  let session = Session::new((*store).clone());
  let profile = MemberService::new(&session)
    .get_with_relations(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("member {id} not found")))?;
  Ok(Json(profile))
}
