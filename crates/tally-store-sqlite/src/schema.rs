//! SQL schema for the tally SQLite store.
//!
//! One table, keyed by the identity token. Timestamps are integer Unix
//! seconds with `0` as the "unset" sentinel, matching the legacy layout.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS attendance (
    identity_token TEXT PRIMARY KEY,   -- 64-char lowercase hex digest
    given_name     TEXT,
    family_name    TEXT,
    document_id    TEXT,
    entry_time     INTEGER NOT NULL DEFAULT 0,
    exit_time      INTEGER NOT NULL DEFAULT 0
);

PRAGMA user_version = 1;
";

/// Descriptive columns that older databases may lack. Stores created before
/// these fields existed held only the token and the two timestamps; opening
/// such a file adds the missing columns without touching existing rows.
pub const DESCRIPTIVE_COLUMNS: &[&str] =
  &["given_name", "family_name", "document_id"];
