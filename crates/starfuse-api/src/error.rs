//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error leaves the service as the envelope
//! `{"success": false, "error": {"code", "message", "details"?}}`.
//! Internal errors are logged in full but reach the caller as a generic
//! message.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("invalid {field}: {message}")]
  Validation { field: String, message: String },

  #[error("character {id} not found or unavailable")]
  CharacterUnavailable { id: String },

  #[error("rate limit exceeded: {limit} requests per {window_secs}s window")]
  RateLimited { limit: u32, window_secs: u64 },

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
    ApiError::Validation {
      field:   field.into(),
      message: message.into(),
    }
  }

  pub fn internal(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    ApiError::Internal(Box::new(e))
  }
}

impl From<starfuse_fusion::Error> for ApiError {
  fn from(e: starfuse_fusion::Error) -> Self {
    match e {
      starfuse_fusion::Error::Validation { field, message } => ApiError::Validation {
        field: field.to_owned(),
        message,
      },
      starfuse_fusion::Error::CharacterUnavailable { id } => {
        ApiError::CharacterUnavailable { id }
      }
      starfuse_fusion::Error::Store(e) => ApiError::Internal(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, code, message, details) = match &self {
      ApiError::Validation { field, message } => (
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
        format!("invalid {field}: {message}"),
        Some(json!({ "field": field })),
      ),
      ApiError::CharacterUnavailable { id } => (
        StatusCode::BAD_REQUEST,
        "CHARACTER_UNAVAILABLE",
        format!("character {id} not found or unavailable"),
        None,
      ),
      ApiError::RateLimited { limit, window_secs } => (
        StatusCode::TOO_MANY_REQUESTS,
        "RATE_LIMIT_EXCEEDED",
        format!("rate limit exceeded: {limit} requests per {window_secs}s window"),
        Some(json!({ "limit": limit, "windowSeconds": window_secs })),
      ),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "unexpected internal error");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "INTERNAL_ERROR",
          "an unexpected error occurred".to_owned(),
          None,
        )
      }
    };

    let mut error = json!({ "code": code, "message": message });
    if let Some(details) = details {
      error["details"] = details;
    }
    (status, Json(json!({ "success": false, "error": error }))).into_response()
  }
}
