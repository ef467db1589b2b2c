//! Client for the Star Wars data service (SWAPI-compatible).
//!
//! The provider reports every field as a string, uses `"unknown"` / `"n/a"`
//! for missing numerics, comma-groups large numbers, and references related
//! resources by URL. Normalization happens here, at the boundary.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use starfuse_core::{
  character::{Character, HomeworldRef, Planet},
  store::CharacterSource,
};

use crate::{Error, Result, UPSTREAM_TIMEOUT};

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the character/planet provider.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SwapiClient {
  client:   Client,
  base_url: String,
}

impl SwapiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(UPSTREAM_TIMEOUT)
      .build()
      .map_err(Error::ClientBuild)?;
    Ok(SwapiClient {
      client,
      base_url: base_url.into(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  async fn fetch_json<T: serde::de::DeserializeOwned>(
    &self,
    path: &str,
    resource: &'static str,
    id: u32,
  ) -> Result<T> {
    let url = self.url(path);
    tracing::debug!(%url, "fetching upstream resource");
    let resp = self.client.get(&url).send().await?;

    match resp.status() {
      StatusCode::NOT_FOUND => Err(Error::NotFound { resource, id }),
      s if s.is_success() => Ok(resp.json().await?),
      s => Err(Error::Status { status: s, url }),
    }
  }
}

impl CharacterSource for SwapiClient {
  type Error = Error;

  /// `GET /people/{id}/`
  async fn character(&self, id: u32) -> Result<Character> {
    let raw: RawCharacter = self
      .fetch_json(&format!("/people/{id}/"), "character", id)
      .await?;
    Ok(raw.normalize(id))
  }

  /// `GET /planets/{id}/`
  async fn planet(&self, id: u32) -> Result<Planet> {
    let raw: RawPlanet = self
      .fetch_json(&format!("/planets/{id}/"), "planet", id)
      .await?;
    Ok(raw.normalize(id))
  }
}

// ─── Wire DTOs ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawCharacter {
  name:       String,
  height:     String,
  mass:       String,
  hair_color: String,
  eye_color:  String,
  birth_year: String,
  gender:     String,
  homeworld:  String,
}

impl RawCharacter {
  fn normalize(self, id: u32) -> Character {
    Character {
      id,
      name: self.name,
      height: parse_number(&self.height),
      mass: parse_number(&self.mass),
      hair_color: self.hair_color,
      eye_color: self.eye_color,
      birth_year: self.birth_year,
      gender: self.gender,
      homeworld: HomeworldRef {
        id:  resource_id(&self.homeworld),
        url: self.homeworld,
      },
    }
  }
}

#[derive(Debug, Deserialize)]
struct RawPlanet {
  name:       String,
  climate:    String,
  terrain:    String,
  population: String,
}

impl RawPlanet {
  fn normalize(self, id: u32) -> Planet {
    Planet {
      id,
      name: self.name,
      climate: split_terms(&self.climate),
      terrain: split_terms(&self.terrain),
      population: parse_number(&self.population),
    }
  }
}

// ─── Normalization helpers ───────────────────────────────────────────────────

/// Parse a provider numeric string; `"unknown"`, `"n/a"` and unparseable
/// values become `None`. Comma group separators are tolerated.
fn parse_number(s: &str) -> Option<f64> {
  let s = s.trim();
  if s.is_empty() || s.eq_ignore_ascii_case("unknown") || s.eq_ignore_ascii_case("n/a") {
    return None;
  }
  s.replace(',', "").parse().ok()
}

/// Split a comma-separated term list, preserving upstream order.
fn split_terms(s: &str) -> Vec<String> {
  s.split(',')
    .map(|t| t.trim().to_owned())
    .filter(|t| !t.is_empty())
    .collect()
}

/// Extract the trailing numeric id from a resource URL such as
/// `https://swapi.dev/api/planets/1/`.
fn resource_id(url: &str) -> Option<u32> {
  url
    .trim_end_matches('/')
    .rsplit('/')
    .next()
    .and_then(|seg| seg.parse().ok())
}
