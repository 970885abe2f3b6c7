//! External 64-bit handles.
//!
//! Discord snowflakes are unsigned 64-bit values, but the schema stores them
//! in signed `BIGINT` columns. The conversions here reinterpret the bit
//! pattern in both directions, so every `u64` (including `u64::MAX`, stored
//! as `-1`) survives a round trip through the database unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! external_handle {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
      Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub u64);

    impl $name {
      /// Rebuild the handle from its stored (signed) column value.
      pub const fn from_stored(stored: i64) -> Self {
        Self(u64::from_ne_bytes(stored.to_ne_bytes()))
      }

      /// The signed value written to the database column.
      pub const fn to_stored(self) -> i64 {
        i64::from_ne_bytes(self.0.to_ne_bytes())
      }
    }

    impl From<u64> for $name {
      fn from(value: u64) -> Self { Self(value) }
    }

    impl From<$name> for u64 {
      fn from(handle: $name) -> Self { handle.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }
  };
}

external_handle!(
  /// A member's Discord user ID (column `member.discordID`).
  DiscordId
);

external_handle!(
  /// The Discord guild a family belongs to (column `family.guildID`).
  GuildId
);
