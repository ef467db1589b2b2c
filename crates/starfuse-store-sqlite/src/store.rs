//! [`SqliteStore`] — the SQLite implementation of both storage traits.

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use starfuse_core::{
  history::{HistoryRecord, NewRecord, RecordSource},
  store::{CacheStore, HistoryPage, HistoryQuery, HistoryStore},
};

use crate::{
  Error, Result,
  cursor::{Cursor, Position},
  schema::SCHEMA,
};

fn now_ms() -> i64 { Utc::now().timestamp_millis() }

// ─── Store ───────────────────────────────────────────────────────────────────

/// Cache and history stores backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Physically delete logically-expired rows from both tables.
  ///
  /// Reads already treat expired rows as absent; this merely reclaims
  /// space. Returns `(cache_rows, history_rows)` removed.
  pub async fn purge_expired(&self) -> Result<(usize, usize)> {
    let now = now_ms();
    let counts = self
      .conn
      .call(move |conn| {
        let cache = conn.execute(
          "DELETE FROM cache_entries WHERE expires_at <= ?1",
          rusqlite::params![now],
        )?;
        let history = conn.execute(
          "DELETE FROM history_records
             WHERE expires_at IS NOT NULL AND expires_at <= ?1",
          rusqlite::params![now],
        )?;
        Ok((cache, history))
      })
      .await?;
    Ok(counts)
  }

  /// Fetch up to `limit` live records from one partition, newest first,
  /// strictly before `pos` when a resume position is given.
  async fn fetch_partition(
    &self,
    source: RecordSource,
    pos: Option<Position>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    limit: usize,
  ) -> Result<Vec<RawRecord>> {
    let source_str = source.prefix().to_owned();
    let now = now_ms();
    let (pos_created, pos_id) = match pos {
      Some(p) => (Some(p.created_at), Some(p.id)),
      None => (None, None),
    };

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT record_id, source, created_at, payload_json, meta_json, expires_at
             FROM history_records
            WHERE source = ?1
              AND (expires_at IS NULL OR expires_at > ?2)
              AND (?3 IS NULL OR created_at >= ?3)
              AND (?4 IS NULL OR created_at <= ?4)
              AND (?5 IS NULL
                   OR created_at < ?5
                   OR (created_at = ?5 AND record_id < ?6))
            ORDER BY created_at DESC, record_id DESC
            LIMIT ?7",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              source_str,
              now,
              start_time,
              end_time,
              pos_created,
              pos_id,
              limit as i64,
            ],
            |r| {
              Ok(RawRecord {
                record_id:    r.get(0)?,
                source:       r.get(1)?,
                created_at:   r.get(2)?,
                payload_json: r.get(3)?,
                meta_json:    r.get(4)?,
                expires_at:   r.get(5)?,
              })
            },
          )?
          .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}

// ─── CacheStore impl ─────────────────────────────────────────────────────────

impl CacheStore for SqliteStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
    let key = key.to_owned();
    let now = now_ms();

    let row: Option<String> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            "SELECT value_json FROM cache_entries
              WHERE cache_key = ?1 AND expires_at > ?2",
            rusqlite::params![key, now],
            |r| r.get(0),
          )
          .optional()?;
        Ok(row)
      })
      .await?;

    match row {
      Some(json) => Ok(Some(serde_json::from_str(&json)?)),
      None => Ok(None),
    }
  }

  async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> Result<()> {
    let key = key.to_owned();
    let value_json = value.to_string();
    let expires_at = now_ms() + ttl.as_millis() as i64;

    self
      .conn
      .call(move |conn| {
        // Unconditional overwrite: no compare-and-swap semantics.
        conn.execute(
          "INSERT OR REPLACE INTO cache_entries (cache_key, value_json, expires_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![key, value_json, expires_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── HistoryStore impl ───────────────────────────────────────────────────────

impl HistoryStore for SqliteStore {
  type Error = Error;

  async fn append(&self, record: NewRecord) -> Result<HistoryRecord> {
    let now = now_ms();
    let stored = HistoryRecord {
      id:         Uuid::new_v4(),
      source:     record.source,
      created_at: now,
      payload:    record.payload,
      meta:       record.meta,
      expires_at: record.ttl.map(|ttl| now + ttl.as_millis() as i64),
    };

    let record_id = stored.id.hyphenated().to_string();
    let source = stored.source.prefix().to_owned();
    let created_at = stored.created_at;
    let payload_json = stored.payload.to_string();
    let meta_json = serde_json::to_string(&stored.meta)?;
    let expires_at = stored.expires_at;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO history_records
             (record_id, source, created_at, payload_json, meta_json, expires_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![record_id, source, created_at, payload_json, meta_json, expires_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(stored)
  }

  async fn scan(&self, query: &HistoryQuery) -> Result<HistoryPage> {
    let cursor = match query.cursor.as_deref() {
      None => Cursor::default(),
      Some(raw) => match Cursor::decode(raw) {
        Ok(cursor) => cursor,
        Err(e) => {
          tracing::warn!(error = %e, "ignoring malformed history cursor");
          Cursor::default()
        }
      },
    };

    // Over-fetch one row per partition so has_next needs no second query.
    let mut fetched: Vec<RawRecord> = Vec::new();
    for &source in query.source.sources() {
      let rows = self
        .fetch_partition(
          source,
          cursor.position(source).cloned(),
          query.start_time,
          query.end_time,
          query.limit + 1,
        )
        .await?;
      fetched.extend(rows);
    }

    // Merge newest-first; record_id breaks timestamp ties the same way the
    // SQL ordering does, so pages never overlap.
    fetched.sort_by(|a, b| {
      b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.record_id.cmp(&a.record_id))
    });

    let has_next = fetched.len() > query.limit;
    let page: Vec<RawRecord> = fetched.into_iter().take(query.limit).collect();

    let mut next = cursor;
    for raw in &page {
      let source = RecordSource::parse(&raw.source).map_err(Error::Core)?;
      next.set_position(source, Position {
        created_at: raw.created_at,
        id:         raw.record_id.clone(),
      });
    }

    let items = page
      .into_iter()
      .map(RawRecord::into_record)
      .collect::<Result<Vec<_>>>()?;
    let next_cursor = if has_next { Some(next.encode()?) } else { None };

    Ok(HistoryPage {
      items,
      has_next,
      next_cursor,
    })
  }
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `history_records` row.
struct RawRecord {
  record_id:    String,
  source:       String,
  created_at:   i64,
  payload_json: String,
  meta_json:    String,
  expires_at:   Option<i64>,
}

impl RawRecord {
  fn into_record(self) -> Result<HistoryRecord> {
    Ok(HistoryRecord {
      id:         Uuid::parse_str(&self.record_id)?,
      source:     RecordSource::parse(&self.source).map_err(Error::Core)?,
      created_at: self.created_at,
      payload:    serde_json::from_str(&self.payload_json)?,
      meta:       serde_json::from_str(&self.meta_json)?,
      expires_at: self.expires_at,
    })
  }
}
