//! History records — the append-only log behind `/history`.
//!
//! A record is immutable once appended. Fusion records carry a storage-layer
//! expiry (configurable, default 30 minutes); once past it they are treated
//! as gone from the log, not merely stale. Custom records never expire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Source ──────────────────────────────────────────────────────────────────

/// Which pipeline produced a record. Doubles as the storage key prefix, so
/// the two kinds live in distinct partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
  /// Written by the fusion orchestrator after a cache miss.
  Fusion,
  /// Written by `POST /store` with a caller-supplied payload.
  Custom,
}

impl RecordSource {
  /// The key-prefix string stored in the `source` column.
  pub fn prefix(self) -> &'static str {
    match self {
      RecordSource::Fusion => "fusion",
      RecordSource::Custom => "custom",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "fusion" => Ok(RecordSource::Fusion),
      "custom" => Ok(RecordSource::Custom),
      other => Err(Error::UnknownSource(other.to_owned())),
    }
  }
}

// ─── Metadata ────────────────────────────────────────────────────────────────

/// Optional metadata attached to a history record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
  /// The request that produced this record.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_id:         Option<Uuid>,
  /// Wall-clock pipeline duration, fusion records only.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub processing_time_ms: Option<u64>,
  /// Free-form client-supplied metadata, custom records only.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub client:             Option<serde_json::Value>,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A persisted history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
  pub id:         Uuid,
  pub source:     RecordSource,
  /// Creation timestamp in epoch milliseconds; store-assigned.
  pub created_at: i64,
  pub payload:    serde_json::Value,
  #[serde(default)]
  pub meta:       RecordMeta,
  /// Epoch milliseconds after which the record is gone from the log.
  /// `None` means the record never expires.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expires_at: Option<i64>,
}

/// Input to [`crate::store::HistoryStore::append`].
/// `id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRecord {
  pub source:  RecordSource,
  pub payload: serde_json::Value,
  pub meta:    RecordMeta,
  /// Time-to-live; translated to an absolute `expires_at` on append.
  pub ttl:     Option<std::time::Duration>,
}

impl NewRecord {
  /// A custom record with no expiry.
  pub fn custom(payload: serde_json::Value, meta: RecordMeta) -> Self {
    NewRecord {
      source: RecordSource::Custom,
      payload,
      meta,
      ttl: None,
    }
  }
}
