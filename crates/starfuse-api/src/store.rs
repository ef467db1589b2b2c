//! Handler for `POST /store`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/store` | Body: [`StoreBody`]; returns 201 + the stored record |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
};
use serde::Deserialize;
use starfuse_core::{
  history::{HistoryRecord, NewRecord, RecordMeta},
  store::{CacheStore, CharacterSource, HistoryStore, WeatherSource},
};
use uuid::Uuid;

use crate::{
  AppState,
  envelope::{Envelope, Meta},
  error::ApiError,
};

/// Ceiling on the serialized `data` payload.
pub const MAX_PAYLOAD_CHARS: usize = 1000;

/// JSON body accepted by `POST /store`.
#[derive(Debug, Deserialize)]
pub struct StoreBody {
  /// Required; any JSON value up to [`MAX_PAYLOAD_CHARS`] serialized chars.
  pub data:     Option<serde_json::Value>,
  /// Free-form client metadata recorded alongside the payload.
  pub metadata: Option<serde_json::Value>,
}

/// `POST /store` — returns 201 + the stored [`HistoryRecord`].
pub async fn handler<CS, WS, C, H>(
  State(state): State<AppState<CS, WS, C, H>>,
  body: Result<Json<StoreBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<HistoryRecord>>), ApiError>
where
  CS: CharacterSource + 'static,
  WS: WeatherSource + 'static,
  C: CacheStore + 'static,
  H: HistoryStore + 'static,
{
  let request_id = Uuid::new_v4();

  let Json(body) = body.map_err(|e| ApiError::validation("body", e.body_text()))?;
  let data = body
    .data
    .ok_or_else(|| ApiError::validation("data", "field is required"))?;

  let serialized_len = data.to_string().chars().count();
  if serialized_len > MAX_PAYLOAD_CHARS {
    return Err(ApiError::validation(
      "data",
      format!(
        "serialized payload is {serialized_len} characters, limit is {MAX_PAYLOAD_CHARS}"
      ),
    ));
  }

  let record = NewRecord::custom(data, RecordMeta {
    request_id:         Some(request_id),
    processing_time_ms: None,
    client:             body.metadata,
  });

  // Unlike the fusion pipeline's best-effort append, a failed write here is
  // the whole request failing.
  let stored = state
    .history_store
    .append(record)
    .await
    .map_err(ApiError::internal)?;

  Ok((
    StatusCode::CREATED,
    Json(Envelope::ok(stored, Meta::new(request_id))),
  ))
}
