//! JSON REST API for kin.
//!
//! Exposes an axum [`Router`] backed by any [`kin_core::store::Store`]. Every
//! request works through its own [`kin_core::Session`] over a clone of the
//! store. Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kin_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod families;
pub mod members;

use std::sync::Arc;

use axum::{Router, routing::get};
use kin_core::store::Store;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: Store + Clone + 'static,
{
  Router::new()
    // Families
    .route("/families", get(families::list::<S>))
    .route("/families/{id}", get(families::get_one::<S>))
    .route(
      "/families/{id}/member-connections",
      get(families::member_connections::<S>),
    )
    // Members
    .route("/members/{id}", get(members::get_one::<S>))
    .with_state(store)
}
