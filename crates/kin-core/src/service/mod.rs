//! Services consumed by upstream callers (the HTTP API, bots, …).
//!
//! Each service borrows a [`crate::Session`]; it never owns one, so several
//! services can share the same unit of work.

mod family;
mod member;
mod member_connection;

pub use family::FamilyService;
pub use member::{MemberProfile, MemberService};
pub use member_connection::{
  CONNECTION_DETAIL, MemberConnectionService, connections_touching,
};
