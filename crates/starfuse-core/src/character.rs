//! Normalized character and planet data from the Star Wars data service.
//!
//! The upstream reports numeric fields as strings and uses the literal
//! `"unknown"` for missing values; normalization turns those into `None`.
//! Structs here are the *normalized* form — raw wire DTOs live in the
//! upstream client crate.

use serde::{Deserialize, Serialize};

// ─── Character ───────────────────────────────────────────────────────────────

/// Reference to a character's homeworld as reported by the upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworldRef {
  /// Numeric planet id extracted from the resource URL, when parseable.
  pub id:  Option<u32>,
  /// The raw upstream URL, kept verbatim for traceability.
  pub url: String,
}

/// A normalized character record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
  pub id:         u32,
  pub name:       String,
  /// Height in centimetres; `None` when the upstream reports "unknown".
  pub height:     Option<f64>,
  /// Mass in kilograms; `None` when the upstream reports "unknown".
  pub mass:       Option<f64>,
  pub hair_color: String,
  pub eye_color:  String,
  pub birth_year: String,
  pub gender:     String,
  pub homeworld:  HomeworldRef,
}

// ─── Planet ──────────────────────────────────────────────────────────────────

/// A normalized planet record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
  pub id:         u32,
  pub name:       String,
  /// Ordered climate terms, e.g. `["arid"]` or `["temperate", "tropical"]`.
  pub climate:    Vec<String>,
  /// Ordered terrain terms.
  pub terrain:    Vec<String>,
  pub population: Option<f64>,
}

impl Planet {
  /// The sentinel substituted when the planet fetch fails.
  ///
  /// A sentinel planet matches no climate keyword, so compatibility falls
  /// through to the default rating.
  pub fn unknown(id: u32) -> Self {
    Planet {
      id,
      name: "Unknown".to_owned(),
      climate: vec!["Unknown".to_owned()],
      terrain: vec!["Unknown".to_owned()],
      population: None,
    }
  }

  /// True if this is the fetch-failure sentinel.
  pub fn is_unknown(&self) -> bool { self.name == "Unknown" }
}
