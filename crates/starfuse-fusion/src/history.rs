//! [`HistoryQueryService`] — validation and page assembly for `/history`.
//!
//! All caller input arrives as raw strings; this module owns turning them
//! into a typed [`HistoryQuery`] with field-specific validation errors, and
//! turning the store's page into the wire-facing view (human-readable
//! timestamps, pagination metadata, echoed filters).

use std::sync::Arc;

use chrono::DateTime;
use serde::Serialize;
use starfuse_core::{
  history::HistoryRecord,
  store::{HistoryQuery, HistoryStore, SourceFilter},
};

use crate::{Error, Result};

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

// ─── Input ───────────────────────────────────────────────────────────────────

/// Raw, unvalidated query parameters as received from the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct HistoryParams {
  /// `fusion`, `custom` or `all`; defaults to `all`.
  pub source:     Option<String>,
  /// Positive integer; defaults to [`DEFAULT_LIMIT`], capped at
  /// [`MAX_LIMIT`].
  pub limit:      Option<String>,
  /// Inclusive epoch-millisecond bounds.
  pub start_time: Option<String>,
  pub end_time:   Option<String>,
  /// Opaque continuation cursor from a previous page.
  pub cursor:     Option<String>,
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// A history record plus the human-readable creation time added on output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
  #[serde(flatten)]
  pub record:         HistoryRecord,
  /// RFC 3339 rendering of `created_at`.
  pub created_at_iso: String,
}

impl From<HistoryRecord> for HistoryItem {
  fn from(record: HistoryRecord) -> Self {
    let created_at_iso = DateTime::from_timestamp_millis(record.created_at)
      .map(|dt| dt.to_rfc3339())
      .unwrap_or_default();
    HistoryItem {
      record,
      created_at_iso,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub count:       usize,
  pub has_next:    bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_cursor: Option<String>,
}

/// The filters the query actually ran with, echoed back to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterEcho {
  pub source:     &'static str,
  pub limit:      usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start_time: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub end_time:   Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
  pub items:      Vec<HistoryItem>,
  pub pagination: Pagination,
  pub filters:    FilterEcho,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct HistoryQueryService<H> {
  store: Arc<H>,
}

impl<H: HistoryStore> HistoryQueryService<H> {
  pub fn new(store: Arc<H>) -> Self { HistoryQueryService { store } }

  /// Validate `params`, run the scan, and assemble the page view.
  ///
  /// Validation happens before any store access: an inverted time range or
  /// a bad limit never reaches the backend.
  pub async fn query(&self, params: HistoryParams) -> Result<HistoryView> {
    let source = parse_source(params.source.as_deref())?;
    let limit = parse_limit(params.limit.as_deref())?;
    let start_time = parse_epoch_ms("startTime", params.start_time.as_deref())?;
    let end_time = parse_epoch_ms("endTime", params.end_time.as_deref())?;

    if let (Some(start), Some(end)) = (start_time, end_time)
      && start > end
    {
      return Err(Error::validation(
        "startTime",
        "startTime must not be after endTime",
      ));
    }

    let query = HistoryQuery {
      source,
      start_time,
      end_time,
      limit,
      cursor: params.cursor,
    };

    let page = self
      .store
      .scan(&query)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    let items: Vec<HistoryItem> = page.items.into_iter().map(HistoryItem::from).collect();

    Ok(HistoryView {
      pagination: Pagination {
        count:       items.len(),
        has_next:    page.has_next,
        next_cursor: page.next_cursor,
      },
      filters: FilterEcho {
        source: source_name(source),
        limit,
        start_time,
        end_time,
      },
      items,
    })
  }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

fn parse_source(raw: Option<&str>) -> Result<SourceFilter> {
  match raw {
    None | Some("all") => Ok(SourceFilter::All),
    Some("fusion") => Ok(SourceFilter::Fusion),
    Some("custom") => Ok(SourceFilter::Custom),
    Some(other) => Err(Error::validation(
      "source",
      format!("expected one of fusion, custom, all; got {other:?}"),
    )),
  }
}

fn source_name(filter: SourceFilter) -> &'static str {
  match filter {
    SourceFilter::Fusion => "fusion",
    SourceFilter::Custom => "custom",
    SourceFilter::All => "all",
  }
}

fn parse_limit(raw: Option<&str>) -> Result<usize> {
  match raw {
    None => Ok(DEFAULT_LIMIT),
    Some(s) => match s.trim().parse::<i64>() {
      Ok(n) if n > 0 => Ok((n as usize).min(MAX_LIMIT)),
      _ => Err(Error::validation(
        "limit",
        format!("expected a positive integer, got {s:?}"),
      )),
    },
  }
}

fn parse_epoch_ms(field: &'static str, raw: Option<&str>) -> Result<Option<i64>> {
  match raw {
    None => Ok(None),
    Some(s) => match s.trim().parse::<i64>() {
      Ok(ms) if ms >= 0 => Ok(Some(ms)),
      _ => Err(Error::validation(
        field,
        format!("expected epoch milliseconds, got {s:?}"),
      )),
    },
  }
}
