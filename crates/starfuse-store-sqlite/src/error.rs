//! Error type for `starfuse-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] starfuse_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A continuation cursor that could not be decoded. Scans downgrade this
  /// to a warning and restart from the beginning.
  #[error("malformed cursor: {0}")]
  BadCursor(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
