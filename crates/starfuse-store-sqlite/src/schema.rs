//! SQL schema for the starfuse SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- TTL key-value cache. Expiry is logical: readers must ignore rows past
-- expires_at whether or not purge_expired has removed them yet.
CREATE TABLE IF NOT EXISTS cache_entries (
    cache_key  TEXT PRIMARY KEY,
    value_json TEXT NOT NULL,
    expires_at INTEGER NOT NULL     -- epoch millis
);

-- History is strictly append-only.
-- No UPDATE is ever issued; rows leave only by TTL expiry.
CREATE TABLE IF NOT EXISTS history_records (
    record_id    TEXT PRIMARY KEY,
    source       TEXT NOT NULL,     -- 'fusion' | 'custom' partition prefix
    created_at   INTEGER NOT NULL,  -- epoch millis; store-assigned
    payload_json TEXT NOT NULL,
    meta_json    TEXT NOT NULL DEFAULT '{}',
    expires_at   INTEGER            -- NULL = never expires
);

CREATE INDEX IF NOT EXISTS history_scan_idx
    ON history_records(source, created_at DESC, record_id DESC);

PRAGMA user_version = 1;
";
