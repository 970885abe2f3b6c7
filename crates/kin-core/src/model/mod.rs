//! Domain models and their table mappings.
//!
//! Navigation properties (`sex`, `user`, `family`, …) are `None` unless the
//! query that produced the row asked for them through an include path.
//! Back-references such as "families created by this member" are not stored
//! on the models; see [`crate::relations::RelationIndex`].

mod connection_type;
mod family;
mod family_connection;
mod member;
mod member_connection;
mod sex;

pub use connection_type::ConnectionType;
pub use family::Family;
pub use family_connection::{FamilyConnection, FamilyConnectionKey};
pub use member::Member;
pub use member_connection::{MemberConnection, MemberConnectionKey};
pub use sex::Sex;

pub type UserId = i32;
pub type FamilyId = i32;
