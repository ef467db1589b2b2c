//! Error type for `starfuse-upstream`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  ClientBuild(#[source] reqwest::Error),

  /// Transport-level failure, including the 10-second timeout ceiling.
  #[error("upstream request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("{resource} {id} not found upstream")]
  NotFound { resource: &'static str, id: u32 },

  #[error("unexpected status {status} from {url}")]
  Status {
    status: reqwest::StatusCode,
    url:    String,
  },

  /// The weather provider needs an API key and none was configured.
  /// The orchestrator treats this like any other weather failure and
  /// serves simulated data.
  #[error("weather API key not configured")]
  MissingApiKey,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
