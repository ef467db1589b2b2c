//! The merged fusion result and the climate-compatibility rating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  character::{Character, Planet},
  weather::{Weather, WeatherOrigin},
};

// ─── Compatibility ───────────────────────────────────────────────────────────

/// How well the current real-world weather matches the planet's climate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compatibility {
  Perfect,
  Good,
  Fair,
  Poor,
  /// Weather was simulated, so no meaningful rating exists.
  Unknown,
}

/// Rate how compatible `weather` is with `planet`'s climate.
///
/// Climate keywords are checked in priority order; the first matching rule
/// wins. Simulated weather always yields [`Compatibility::Unknown`]
/// regardless of the table.
///
/// | Climate contains | Rule |
/// |------------------|------|
/// | `desert` | temp > 25 and clear → perfect; temp > 15 → good; else poor |
/// | `frozen` / `cold` | temp < 0 → perfect; temp < 10 → good; else poor |
/// | `temperate` | 15..=25 → perfect; 5..=30 → good; else fair |
/// | `tropical` / `jungle` | temp > 20 and humidity > 70 → perfect; temp > 15 → good; else fair |
/// | (no match) | fair |
pub fn rate_compatibility(planet: &Planet, weather: &Weather) -> Compatibility {
  use Compatibility::{Fair, Good, Perfect, Poor, Unknown};

  if weather.source == WeatherOrigin::Simulated {
    return Unknown;
  }

  let climate = planet.climate.join(" ").to_lowercase();
  let temp = weather.temperature_c;
  let humidity = weather.humidity_pct;

  if climate.contains("desert") {
    let clear = weather.condition.to_lowercase().contains("clear");
    return if temp > 25.0 && clear {
      Perfect
    } else if temp > 15.0 {
      Good
    } else {
      Poor
    };
  }

  if climate.contains("frozen") || climate.contains("cold") {
    return if temp < 0.0 {
      Perfect
    } else if temp < 10.0 {
      Good
    } else {
      Poor
    };
  }

  if climate.contains("temperate") {
    return if (15.0..=25.0).contains(&temp) {
      Perfect
    } else if (5.0..=30.0).contains(&temp) {
      Good
    } else {
      Fair
    };
  }

  if climate.contains("tropical") || climate.contains("jungle") {
    return if temp > 20.0 && humidity > 70.0 {
      Perfect
    } else if temp > 15.0 {
      Good
    } else {
      Fair
    };
  }

  Fair
}

// ─── Data quality ────────────────────────────────────────────────────────────

/// Quality of one sub-source of a fusion result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
  /// Fetched live and fully populated.
  Complete,
  /// The fetch failed and a sentinel value was substituted.
  Partial,
  /// The value was synthesised locally.
  Fallback,
}

/// Per-sub-source quality tags for a fusion result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
  pub character: Quality,
  pub planet:    Quality,
  pub weather:   Quality,
}

// ─── FusionResult ────────────────────────────────────────────────────────────

/// The merged Character + Planet + Weather projection for one character id.
///
/// Immutable once produced; identified by the character id; invalidated only
/// by cache TTL expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionResult {
  pub character:     Character,
  pub homeworld:     Planet,
  pub weather:       Weather,
  pub compatibility: Compatibility,
  pub data_quality:  DataQuality,
  pub generated_at:  DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::character::Planet;

  fn planet(climate: &[&str]) -> Planet {
    Planet {
      id:         1,
      name:       "Test".into(),
      climate:    climate.iter().map(|s| s.to_string()).collect(),
      terrain:    vec!["plains".into()],
      population: None,
    }
  }

  fn weather(temp: f64, humidity: f64, condition: &str) -> Weather {
    Weather {
      location:       "Testville".into(),
      country:        "TS".into(),
      temperature_c:  temp,
      feels_like_c:   temp,
      humidity_pct:   humidity,
      pressure_hpa:   1013.0,
      visibility_km:  10.0,
      wind_speed_kmh: 12.0,
      wind_deg:       90.0,
      condition:      condition.into(),
      source:         WeatherOrigin::Live,
      is_fallback:    false,
    }
  }

  #[test]
  fn desert_hot_and_clear_is_perfect() {
    let rating =
      rate_compatibility(&planet(&["arid", "desert"]), &weather(30.0, 20.0, "clear sky"));
    assert_eq!(rating, Compatibility::Perfect);
  }

  #[test]
  fn desert_hot_but_cloudy_is_good() {
    let rating =
      rate_compatibility(&planet(&["desert"]), &weather(30.0, 20.0, "overcast clouds"));
    assert_eq!(rating, Compatibility::Good);
  }

  #[test]
  fn desert_cold_is_poor() {
    let rating = rate_compatibility(&planet(&["desert"]), &weather(5.0, 20.0, "clear sky"));
    assert_eq!(rating, Compatibility::Poor);
  }

  #[test]
  fn frozen_below_zero_is_perfect() {
    let rating = rate_compatibility(&planet(&["frozen"]), &weather(-12.0, 60.0, "snow"));
    assert_eq!(rating, Compatibility::Perfect);
  }

  #[test]
  fn cold_keyword_matches_frozen_rule() {
    let rating = rate_compatibility(&planet(&["cold"]), &weather(6.0, 60.0, "mist"));
    assert_eq!(rating, Compatibility::Good);
  }

  #[test]
  fn temperate_mild_is_perfect() {
    let rating =
      rate_compatibility(&planet(&["temperate"]), &weather(20.0, 50.0, "few clouds"));
    assert_eq!(rating, Compatibility::Perfect);
  }

  #[test]
  fn temperate_extreme_is_fair() {
    let rating = rate_compatibility(&planet(&["temperate"]), &weather(40.0, 50.0, "clear"));
    assert_eq!(rating, Compatibility::Fair);
  }

  #[test]
  fn tropical_hot_and_humid_is_perfect() {
    let rating =
      rate_compatibility(&planet(&["tropical"]), &weather(28.0, 85.0, "light rain"));
    assert_eq!(rating, Compatibility::Perfect);
  }

  #[test]
  fn jungle_warm_but_dry_is_good() {
    let rating = rate_compatibility(&planet(&["jungle"]), &weather(18.0, 40.0, "haze"));
    assert_eq!(rating, Compatibility::Good);
  }

  #[test]
  fn first_matching_keyword_wins() {
    // "desert" is checked before "temperate": the desert rule applies.
    let rating = rate_compatibility(
      &planet(&["desert", "temperate"]),
      &weather(20.0, 50.0, "clear sky"),
    );
    assert_eq!(rating, Compatibility::Good);
  }

  #[test]
  fn unmatched_climate_is_fair() {
    let rating = rate_compatibility(&planet(&["murky"]), &weather(20.0, 50.0, "fog"));
    assert_eq!(rating, Compatibility::Fair);
  }

  #[test]
  fn simulated_weather_is_always_unknown() {
    let mut w = weather(30.0, 20.0, "clear sky");
    w.source = WeatherOrigin::Simulated;
    w.is_fallback = true;
    let rating = rate_compatibility(&planet(&["desert"]), &w);
    assert_eq!(rating, Compatibility::Unknown);
  }
}
