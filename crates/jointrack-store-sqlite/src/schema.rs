//! SQL schema for the jointrack SQLite store.
//!
//! Executed on every connection open. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `synchronous = FULL` makes every autocommit write durable before the
/// statement returns.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous = FULL;

-- One row per identity. Rows are only ever inserted or incremented.
CREATE TABLE IF NOT EXISTS player_stats (
    identity    INTEGER PRIMARY KEY,   -- u64 id stored bit-for-bit as i64
    join_count  INTEGER NOT NULL DEFAULT 1
);

PRAGMA user_version = 1;
";

/// Insert-or-increment in a single statement; SQLite serialises concurrent
/// writers, so each caller sees its own post-increment value.
pub const INCREMENT: &str = "
INSERT INTO player_stats (identity, join_count) VALUES (?1, 1)
ON CONFLICT (identity) DO UPDATE SET join_count = join_count + 1
RETURNING join_count
";
