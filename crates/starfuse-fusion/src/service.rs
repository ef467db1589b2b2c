//! [`FusionService`] — the fetch → normalize → merge → cache → persist
//! pipeline.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use chrono::Utc;
use starfuse_core::{
  character::Planet,
  fusion::{DataQuality, FusionResult, Quality, rate_compatibility},
  history::{NewRecord, RecordMeta, RecordSource},
  store::{CacheStore, CharacterSource, HistoryStore, WeatherSource},
};
use uuid::Uuid;

use crate::{Error, Result, fallback::WeatherFallback, locations::location_for};

/// Default TTL for both the result cache and fusion history rows.
const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Deterministic cache key for a character's fusion result.
pub fn cache_key(id: u32) -> String { format!("fusion:character:{id}") }

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct FusionConfig {
  /// TTL for cached fusion results.
  pub cache_ttl:   Duration,
  /// TTL for fusion history rows. Deliberately a separate knob: expiring the
  /// audit log at the cache TTL is the reference behavior, not a law.
  pub history_ttl: Duration,
}

impl Default for FusionConfig {
  fn default() -> Self {
    FusionConfig {
      cache_ttl:   DEFAULT_TTL,
      history_ttl: DEFAULT_TTL,
    }
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// A fusion result plus how it was obtained.
#[derive(Debug, Clone)]
pub struct FusionOutcome {
  pub result:             FusionResult,
  /// True when the result came straight from cache (no upstream calls,
  /// no history row).
  pub cached:             bool,
  /// Sum of the measured upstream stage durations; zero on a cache hit.
  pub processing_time_ms: u64,
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Orchestrates one fusion request end to end.
///
/// Failure policy, stage by stage: a cache outage degrades to a miss; a
/// character failure aborts with [`Error::CharacterUnavailable`]; a planet
/// failure substitutes the sentinel planet; a weather failure substitutes
/// simulated data; cache-write and history-append failures are logged and
/// the already-computed result is returned anyway.
pub struct FusionService<CS, WS, C, H> {
  characters: Arc<CS>,
  weather:    Arc<WS>,
  cache:      Arc<C>,
  history:    Arc<H>,
  fallback:   Box<dyn WeatherFallback>,
  config:     FusionConfig,
}

impl<CS, WS, C, H> FusionService<CS, WS, C, H>
where
  CS: CharacterSource,
  WS: WeatherSource,
  C: CacheStore,
  H: HistoryStore,
{
  pub fn new(
    characters: Arc<CS>,
    weather: Arc<WS>,
    cache: Arc<C>,
    history: Arc<H>,
    fallback: Box<dyn WeatherFallback>,
    config: FusionConfig,
  ) -> Self {
    FusionService {
      characters,
      weather,
      cache,
      history,
      fallback,
      config,
    }
  }

  /// Run the pipeline for one character id.
  ///
  /// `raw_id` must parse as a positive integer but is not range-checked;
  /// out-of-range ids are delegated to the upstream provider. `request_id`
  /// is recorded in the history row's metadata.
  pub async fn fuse(&self, raw_id: &str, request_id: Uuid) -> Result<FusionOutcome> {
    let id = parse_character_id(raw_id)?;
    let key = cache_key(id);

    // Cache-aside read. A hit short-circuits the whole pipeline: no
    // upstream calls, no history row, no cache rewrite.
    match self.cache.get(&key).await {
      Ok(Some(value)) => match serde_json::from_value::<FusionResult>(value) {
        Ok(result) => {
          tracing::debug!(%key, "fusion cache hit");
          return Ok(FusionOutcome {
            result,
            cached: true,
            processing_time_ms: 0,
          });
        }
        Err(e) => {
          tracing::warn!(%key, error = %e, "discarding undecodable cache entry")
        }
      },
      Ok(None) => {}
      Err(e) => {
        tracing::warn!(%key, error = %e, "cache read failed, falling through to upstream")
      }
    }

    let mut elapsed = Duration::ZERO;

    // Character fetch — the only stage that can abort.
    let started = Instant::now();
    let fetched = self.characters.character(id).await;
    elapsed += started.elapsed();
    let character = fetched.map_err(|e| {
      tracing::warn!(id, error = %e, "character fetch failed");
      Error::CharacterUnavailable {
        id: raw_id.trim().to_owned(),
      }
    })?;

    // Planet fetch — partial-success path on failure.
    let (homeworld, planet_quality) = match character.homeworld.id {
      Some(planet_id) => {
        let started = Instant::now();
        let fetched = self.characters.planet(planet_id).await;
        elapsed += started.elapsed();
        match fetched {
          Ok(planet) => (planet, Quality::Complete),
          Err(e) => {
            tracing::warn!(planet_id, error = %e, "planet fetch failed, using sentinel");
            (Planet::unknown(planet_id), Quality::Partial)
          }
        }
      }
      None => {
        tracing::warn!(id, "homeworld URL carried no planet id, using sentinel");
        (Planet::unknown(0), Quality::Partial)
      }
    };

    // Weather fetch — simulated-fallback path on failure.
    let location = location_for(&homeworld.name);
    let started = Instant::now();
    let fetched = self.weather.current(location).await;
    elapsed += started.elapsed();
    let (weather, weather_quality) = match fetched {
      Ok(weather) => (weather, Quality::Complete),
      Err(e) => {
        tracing::warn!(location, error = %e, "weather fetch failed, simulating");
        (self.fallback.simulate(location), Quality::Fallback)
      }
    };

    let compatibility = rate_compatibility(&homeworld, &weather);
    let result = FusionResult {
      character,
      homeworld,
      weather,
      compatibility,
      data_quality: DataQuality {
        character: Quality::Complete,
        planet:    planet_quality,
        weather:   weather_quality,
      },
      generated_at: Utc::now(),
    };
    let processing_time_ms = elapsed.as_millis() as u64;

    // Write-through and history append are independent best-effort writes;
    // neither failure reaches the caller. Fallback results are cached too.
    match serde_json::to_value(&result) {
      Ok(payload) => {
        if let Err(e) = self
          .cache
          .set(&key, payload.clone(), self.config.cache_ttl)
          .await
        {
          tracing::warn!(%key, error = %e, "cache write failed");
        }

        let record = NewRecord {
          source:  RecordSource::Fusion,
          payload,
          meta:    RecordMeta {
            request_id:         Some(request_id),
            processing_time_ms: Some(processing_time_ms),
            client:             None,
          },
          ttl:     Some(self.config.history_ttl),
        };
        if let Err(e) = self.history.append(record).await {
          tracing::warn!(error = %e, "history append failed, returning result anyway");
        }
      }
      Err(e) => tracing::warn!(error = %e, "fusion result did not serialize"),
    }

    Ok(FusionOutcome {
      result,
      cached: false,
      processing_time_ms,
    })
  }
}

fn parse_character_id(raw: &str) -> Result<u32> {
  let trimmed = raw.trim();
  match trimmed.parse::<u32>() {
    Ok(id) if id > 0 => Ok(id),
    _ => Err(Error::validation(
      "character",
      format!("expected a positive integer, got {trimmed:?}"),
    )),
  }
}
