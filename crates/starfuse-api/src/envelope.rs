//! The success-response envelope `{success, data, meta}`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Response metadata attached to every successful response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
  pub timestamp:          DateTime<Utc>,
  pub request_id:         Uuid,
  pub version:            &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cached:             Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub processing_time_ms: Option<u64>,
}

impl Meta {
  pub fn new(request_id: Uuid) -> Self {
    Meta {
      timestamp: Utc::now(),
      request_id,
      version: env!("CARGO_PKG_VERSION"),
      cached: None,
      processing_time_ms: None,
    }
  }

  pub fn cached(mut self, cached: bool) -> Self {
    self.cached = Some(cached);
    self
  }

  pub fn processing_time(mut self, ms: u64) -> Self {
    self.processing_time_ms = Some(ms);
    self
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
  pub success: bool,
  pub data:    T,
  pub meta:    Meta,
}

impl<T> Envelope<T> {
  pub fn ok(data: T, meta: Meta) -> Self {
    Envelope {
      success: true,
      data,
      meta,
    }
  }
}
