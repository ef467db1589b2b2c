//! HTTP clients for the two upstream data providers.
//!
//! [`SwapiClient`] fetches characters and planets from the Star Wars data
//! service; [`WeatherClient`] fetches current weather from OpenWeatherMap.
//! Both normalize provider quirks at the boundary (string-typed numerics,
//! `"unknown"` markers, non-metric units) so the rest of the system only
//! sees the types in `starfuse-core`.
//!
//! Each client makes a single attempt per call with a fixed 10-second
//! timeout; a timeout is reported as any other upstream failure and the
//! orchestrator decides whether to fall back.

pub mod error;
pub mod swapi;
pub mod weather;

pub use error::{Error, Result};
pub use swapi::SwapiClient;
pub use weather::WeatherClient;

use std::time::Duration;

/// Ceiling on any single upstream call.
pub(crate) const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);
