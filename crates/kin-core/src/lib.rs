//! Core types and trait definitions for the kin family-graph store.
//!
//! This crate is deliberately free of HTTP and database dependencies. Entities
//! describe their own table layout through [`entity::Entity`]; storage
//! backends (e.g. `kin-store-sqlite`) implement [`store::Store`] over that
//! metadata, and everything above the backend talks to a [`Session`].

pub mod entity;
pub mod error;
pub mod handle;
pub mod model;
pub mod query;
pub mod relations;
pub mod service;
pub mod session;
pub mod store;
pub mod value;

pub use error::{Error, Result};
pub use session::{Repository, Session};
