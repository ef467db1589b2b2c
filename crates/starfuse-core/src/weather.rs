//! Normalized weather data.
//!
//! All metrics are metric units: Celsius, km/h, hPa, km. The upstream client
//! converts from provider units (m/s wind, metres of visibility) before
//! anything downstream sees the values.

use serde::{Deserialize, Serialize};

/// Where a weather reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherOrigin {
  /// Fetched live from the weather provider.
  #[serde(rename = "openweathermap")]
  Live,
  /// Synthesised locally because the provider was unreachable or
  /// unconfigured. Compatibility ratings over simulated data are meaningless
  /// and are reported as unknown.
  #[serde(rename = "simulated")]
  Simulated,
}

impl WeatherOrigin {
  pub fn is_fallback(self) -> bool { matches!(self, WeatherOrigin::Simulated) }
}

/// A normalized current-weather reading for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
  pub location:       String,
  pub country:        String,
  pub temperature_c:  f64,
  pub feels_like_c:   f64,
  pub humidity_pct:   f64,
  pub pressure_hpa:   f64,
  pub visibility_km:  f64,
  pub wind_speed_kmh: f64,
  pub wind_deg:       f64,
  /// Human-readable condition, e.g. "clear sky", "light rain".
  pub condition:      String,
  pub source:         WeatherOrigin,
  /// Explicit flag mirroring `source`; kept on the wire so clients do not
  /// have to compare provider names.
  pub is_fallback:    bool,
}
