//! Handler for `GET /history`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/history` | `?source=&limit=&lastEvaluatedKey=&startTime=&endTime=` all optional |
//!
//! Parameters arrive as raw strings and are validated by
//! [`starfuse_fusion::HistoryQueryService`], so a bad limit or an inverted
//! time range is rejected with a field-specific error before any store
//! access.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use starfuse_core::store::{CacheStore, CharacterSource, HistoryStore, WeatherSource};
use starfuse_fusion::{HistoryParams, HistoryView};
use uuid::Uuid;

use crate::{
  AppState,
  envelope::{Envelope, Meta},
  error::ApiError,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQueryParams {
  pub source:             Option<String>,
  pub limit:              Option<String>,
  /// Continuation cursor from a previous page's `pagination.nextCursor`.
  pub last_evaluated_key: Option<String>,
  pub start_time:         Option<String>,
  pub end_time:           Option<String>,
}

/// `GET /history[?source=...][&limit=...][&lastEvaluatedKey=...][&startTime=...][&endTime=...]`
pub async fn handler<CS, WS, C, H>(
  State(state): State<AppState<CS, WS, C, H>>,
  Query(params): Query<HistoryQueryParams>,
) -> Result<Json<Envelope<HistoryView>>, ApiError>
where
  CS: CharacterSource + 'static,
  WS: WeatherSource + 'static,
  C: CacheStore + 'static,
  H: HistoryStore + 'static,
{
  let request_id = Uuid::new_v4();

  let view = state
    .history
    .query(HistoryParams {
      source:     params.source,
      limit:      params.limit,
      start_time: params.start_time,
      end_time:   params.end_time,
      cursor:     params.last_evaluated_key,
    })
    .await?;

  Ok(Json(Envelope::ok(view, Meta::new(request_id))))
}
