//! Handler for `GET /fusion`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/fusion?character=<id>` | Runs (or replays from cache) the fusion pipeline |

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use starfuse_core::{
  fusion::FusionResult,
  store::{CacheStore, CharacterSource, HistoryStore, WeatherSource},
};
use uuid::Uuid;

use crate::{
  AppState,
  envelope::{Envelope, Meta},
  error::ApiError,
};

#[derive(Debug, Deserialize)]
pub struct FusionParams {
  /// Required character id; positive-integer string.
  pub character: Option<String>,
}

/// `GET /fusion?character=<id>`
pub async fn handler<CS, WS, C, H>(
  State(state): State<AppState<CS, WS, C, H>>,
  Query(params): Query<FusionParams>,
) -> Result<Json<Envelope<FusionResult>>, ApiError>
where
  CS: CharacterSource + 'static,
  WS: WeatherSource + 'static,
  C: CacheStore + 'static,
  H: HistoryStore + 'static,
{
  let request_id = Uuid::new_v4();
  let character = params
    .character
    .ok_or_else(|| ApiError::validation("character", "query parameter is required"))?;

  let outcome = state.fusion.fuse(&character, request_id).await?;

  let meta = Meta::new(request_id)
    .cached(outcome.cached)
    .processing_time(outcome.processing_time_ms);
  Ok(Json(Envelope::ok(outcome.result, meta)))
}
