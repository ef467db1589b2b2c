//! Handler for `GET /healthz`.

use axum::Json;
use serde_json::json;

/// `GET /healthz` — liveness only; no dependency checks.
pub async fn handler() -> Json<serde_json::Value> {
  Json(json!({ "status": "ok" }))
}
