//! Trait seams between the fusion pipeline and its collaborators.
//!
//! Storage backends implement [`CacheStore`] and [`HistoryStore`]; the
//! upstream HTTP clients implement [`CharacterSource`] and [`WeatherSource`].
//! The orchestrator and the API depend only on these abstractions, so tests
//! substitute in-memory or scripted implementations.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::{future::Future, time::Duration};

use crate::{
  character::{Character, Planet},
  history::{HistoryRecord, NewRecord, RecordSource},
  weather::Weather,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Source filter for a history scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFilter {
  Fusion,
  Custom,
  #[default]
  All,
}

impl SourceFilter {
  /// The partitions a scan with this filter touches, in merge order.
  pub fn sources(self) -> &'static [RecordSource] {
    match self {
      SourceFilter::Fusion => &[RecordSource::Fusion],
      SourceFilter::Custom => &[RecordSource::Custom],
      SourceFilter::All => &[RecordSource::Fusion, RecordSource::Custom],
    }
  }
}

/// Parameters for [`HistoryStore::scan`]. Callers are expected to have
/// validated `limit > 0` and `start_time <= end_time` already.
#[derive(Debug, Clone)]
pub struct HistoryQuery {
  pub source:     SourceFilter,
  /// Inclusive lower bound on `created_at`, epoch milliseconds.
  pub start_time: Option<i64>,
  /// Inclusive upper bound on `created_at`, epoch milliseconds.
  pub end_time:   Option<i64>,
  /// Maximum items per page.
  pub limit:      usize,
  /// Opaque continuation cursor from a previous page. A cursor that cannot
  /// be decoded is logged and ignored; the scan restarts from the beginning.
  pub cursor:     Option<String>,
}

/// One page of a history scan.
///
/// Ordering is newest-first within each source partition; a multi-partition
/// scan makes no global chronological guarantee across pages.
#[derive(Debug, Clone)]
pub struct HistoryPage {
  pub items:       Vec<HistoryRecord>,
  /// True when more matching records may exist beyond this page.
  pub has_next:    bool,
  /// Cursor to resume the scan; present iff `has_next`.
  pub next_cursor: Option<String>,
}

// ─── Storage traits ──────────────────────────────────────────────────────────

/// A key-value store with per-entry time-to-live.
///
/// A miss is not an error: `get` returns `None` both for keys never set and
/// for keys past their expiry, whether or not the backend has physically
/// removed them. `set` overwrites unconditionally.
pub trait CacheStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<serde_json::Value>, Self::Error>> + Send + 'a;

  fn set<'a>(
    &'a self,
    key: &'a str,
    value: serde_json::Value,
    ttl: Duration,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// An append-only record log keyed by (source, time).
pub trait HistoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a record, assigning its id and creation timestamp.
  fn append(
    &self,
    record: NewRecord,
  ) -> impl Future<Output = Result<HistoryRecord, Self::Error>> + Send + '_;

  /// Read one page of records matching `query`. Expired records are never
  /// returned.
  fn scan<'a>(
    &'a self,
    query: &'a HistoryQuery,
  ) -> impl Future<Output = Result<HistoryPage, Self::Error>> + Send + 'a;
}

// ─── Upstream traits ─────────────────────────────────────────────────────────

/// The character/planet data provider.
pub trait CharacterSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn character(
    &self,
    id: u32,
  ) -> impl Future<Output = Result<Character, Self::Error>> + Send + '_;

  fn planet(
    &self,
    id: u32,
  ) -> impl Future<Output = Result<Planet, Self::Error>> + Send + '_;
}

/// The live weather provider.
pub trait WeatherSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn current<'a>(
    &'a self,
    location: &'a str,
  ) -> impl Future<Output = Result<Weather, Self::Error>> + Send + 'a;
}
