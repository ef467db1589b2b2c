//! The request-processing pipeline: fusion orchestration and history queries.
//!
//! [`FusionService`] composes a character source, a weather source, a cache
//! and a history log into the merged-result pipeline; it is generic over the
//! trait seams in `starfuse-core` and knows nothing about HTTP or any
//! concrete backend. [`HistoryQueryService`] validates and translates
//! history filters before delegating to the store.

pub mod error;
pub mod fallback;
pub mod history;
pub mod locations;
pub mod service;

pub use error::{Error, Result};
pub use fallback::{RandomFallback, WeatherFallback};
pub use history::{HistoryParams, HistoryQueryService, HistoryView};
pub use service::{FusionConfig, FusionOutcome, FusionService, cache_key};
