//! Error types for `starfuse-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad caller input. The message always names the offending field.
  #[error("invalid {field}: {message}")]
  Validation { field: &'static str, message: String },

  #[error("unknown record source: {0:?}")]
  UnknownSource(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Shorthand for a [`Error::Validation`] with an owned message.
  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Error::Validation {
      field,
      message: message.into(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
