//! SQL schema for the kin SQLite store.
//!
//! Table and column names follow the established MySQL layout so rows can be
//! moved between the two. Every foreign key restricts deletes; nothing
//! cascades.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sex (
    ID    INTEGER PRIMARY KEY,
    Name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS connectiontype (
    ID    INTEGER PRIMARY KEY,
    Name  TEXT NOT NULL,
    Type  INTEGER NOT NULL DEFAULT 0   -- tinyint(1)
);

CREATE TABLE IF NOT EXISTS member (
    UserID     INTEGER PRIMARY KEY,
    discordID  INTEGER NOT NULL,       -- u64 snowflake, bit-cast to i64
    SexID      INTEGER REFERENCES sex(ID) ON DELETE RESTRICT,
    Storage    TEXT
);

-- One-to-one: a sex row belongs to at most one member.
CREATE UNIQUE INDEX IF NOT EXISTS member_sex_idx ON member(SexID);

CREATE TABLE IF NOT EXISTS family (
    ID         INTEGER PRIMARY KEY,
    Name       TEXT NOT NULL,
    CreatorID  INTEGER NOT NULL REFERENCES member(UserID) ON DELETE RESTRICT,
    guildID    INTEGER NOT NULL,       -- u64 snowflake, bit-cast to i64
    Storage    TEXT
);

CREATE TABLE IF NOT EXISTS memberconnection (
    UserID             INTEGER NOT NULL REFERENCES member(UserID) ON DELETE RESTRICT,
    ConnectionTypeID   INTEGER NOT NULL REFERENCES connectiontype(ID) ON DELETE RESTRICT,
    User2ID            INTEGER NOT NULL REFERENCES member(UserID) ON DELETE RESTRICT,
    ConnectionType2ID  INTEGER NOT NULL REFERENCES connectiontype(ID) ON DELETE RESTRICT,
    PRIMARY KEY (UserID, User2ID),
    CHECK (UserID != User2ID)
);

CREATE TABLE IF NOT EXISTS familyconnection (
    UserID    INTEGER NOT NULL REFERENCES member(UserID) ON DELETE RESTRICT,
    FamilyID  INTEGER NOT NULL REFERENCES family(ID) ON DELETE RESTRICT,
    Head      INTEGER NOT NULL DEFAULT 0,   -- tinyint(1)
    PRIMARY KEY (UserID, FamilyID)
);

CREATE INDEX IF NOT EXISTS family_creator_idx      ON family(CreatorID);
CREATE INDEX IF NOT EXISTS memberconnection_u2_idx ON memberconnection(User2ID);
CREATE INDEX IF NOT EXISTS familyconnection_f_idx  ON familyconnection(FamilyID);

PRAGMA user_version = 1;
";
