//! Error type for `starfuse-fusion`.
//!
//! Only two failure classes ever reach a caller of the pipeline: bad input
//! and an unavailable character. Planet, weather, cache and history failures
//! are absorbed by fallbacks inside the pipeline. Store failures can still
//! surface from history *queries*, where there is nothing to fall back to.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad caller input; the message names the offending field.
  #[error("invalid {field}: {message}")]
  Validation { field: &'static str, message: String },

  /// The character provider failed or reported not-found. This is the only
  /// upstream failure that aborts the pipeline.
  #[error("character {id} not found or unavailable")]
  CharacterUnavailable { id: String },

  /// History store failure during a query.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Error::Validation {
      field,
      message: message.into(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
