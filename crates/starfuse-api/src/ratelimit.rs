//! Fixed-window rate limiting over the cache store.
//!
//! The counter key is (client ip, method, path); the window is a fixed
//! interval, so bursts straddling a window boundary can briefly see up to
//! twice the limit — an accepted property of the scheme, not a bug. The
//! read-then-write increment is not atomic either; under heavy concurrency
//! a few extra requests may slip through.
//!
//! The limiter **fails open**: any store or serialization problem lets the
//! request through rather than blocking traffic on limiter health.

use std::time::Duration;

use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use starfuse_core::store::{CacheStore, CharacterSource, HistoryStore, WeatherSource};

use crate::{AppState, error::ApiError};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
  /// Requests allowed per window per (ip, method, path).
  pub limit:  u32,
  pub window: Duration,
}

impl Default for RateLimitConfig {
  fn default() -> Self {
    RateLimitConfig {
      limit:  100,
      window: Duration::from_secs(15 * 60),
    }
  }
}

// ─── Counter ─────────────────────────────────────────────────────────────────

/// The stored counter. The window boundary is fixed at first increment; a
/// counter past its boundary is treated as absent, so a fresh window starts
/// at zero on the next increment.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Counter {
  count:             u32,
  window_expires_at: i64,
}

// ─── Middleware ──────────────────────────────────────────────────────────────

/// Axum middleware enforcing the fixed-window limit around every route.
pub async fn enforce<CS, WS, C, H>(
  State(state): State<AppState<CS, WS, C, H>>,
  req: Request,
  next: Next,
) -> Response
where
  CS: CharacterSource + 'static,
  WS: WeatherSource + 'static,
  C: CacheStore + 'static,
  H: HistoryStore + 'static,
{
  let config = state.rate;
  let ip = client_ip(req.headers());
  let key = format!("ratelimit:{ip}:{}:{}", req.method(), req.uri().path());

  match check_and_count(state.cache.as_ref(), &key, config).await {
    Ok(true) => next.run(req).await,
    Ok(false) => ApiError::RateLimited {
      limit:       config.limit,
      window_secs: config.window.as_secs(),
    }
    .into_response(),
    Err(e) => {
      tracing::warn!(%key, error = %e, "rate limiter failed open");
      next.run(req).await
    }
  }
}

/// Read-increment-store. Returns `Ok(true)` when the request may proceed.
async fn check_and_count<C: CacheStore>(
  cache: &C,
  key: &str,
  config: RateLimitConfig,
) -> Result<bool, C::Error> {
  let now = Utc::now().timestamp_millis();

  let current = match cache.get(key).await? {
    Some(value) => serde_json::from_value::<Counter>(value)
      .ok()
      .filter(|c| c.window_expires_at > now),
    None => None,
  };

  let next = match current {
    Some(c) if c.count >= config.limit => return Ok(false),
    Some(c) => Counter {
      count:             c.count + 1,
      window_expires_at: c.window_expires_at,
    },
    None => Counter {
      count:             1,
      window_expires_at: now + config.window.as_millis() as i64,
    },
  };

  let ttl = Duration::from_millis((next.window_expires_at - now).max(1) as u64);
  match serde_json::to_value(&next) {
    Ok(value) => cache.set(key, value, ttl).await?,
    Err(e) => tracing::warn!(%key, error = %e, "rate counter did not serialize"),
  }
  Ok(true)
}

fn client_ip(headers: &HeaderMap) -> String {
  headers
    .get("x-forwarded-for")
    .and_then(|v| v.to_str().ok())
    .and_then(|s| s.split(',').next())
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| "unknown".to_owned())
}
