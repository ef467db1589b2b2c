//! Simulated weather for when the live provider is unreachable.
//!
//! The generator sits behind a trait so tests can substitute a fixed
//! implementation, and the default implementation takes a seedable RNG so
//! even the random path can be made deterministic.

use std::sync::{Mutex, PoisonError};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use starfuse_core::weather::{Weather, WeatherOrigin};

/// Produces a substitute weather reading for a location.
pub trait WeatherFallback: Send + Sync {
  fn simulate(&self, location: &str) -> Weather;
}

const CONDITIONS: &[&str] = &[
  "clear sky",
  "few clouds",
  "scattered clouds",
  "overcast clouds",
  "light rain",
  "mist",
];

/// Default fallback: plausible randomized metrics, explicitly tagged as
/// simulated.
pub struct RandomFallback {
  rng: Mutex<SmallRng>,
}

impl RandomFallback {
  pub fn new() -> Self {
    RandomFallback {
      rng: Mutex::new(SmallRng::from_entropy()),
    }
  }

  /// Deterministic construction for tests.
  pub fn seeded(seed: u64) -> Self {
    RandomFallback {
      rng: Mutex::new(SmallRng::seed_from_u64(seed)),
    }
  }
}

impl Default for RandomFallback {
  fn default() -> Self { RandomFallback::new() }
}

impl WeatherFallback for RandomFallback {
  fn simulate(&self, location: &str) -> Weather {
    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

    // "Cairo,EG" → ("Cairo", "EG"); a bare name leaves country empty.
    let (name, country) = match location.split_once(',') {
      Some((n, c)) => (n.trim(), c.trim()),
      None => (location.trim(), ""),
    };

    let temperature = round1(rng.gen_range(-5.0..35.0));
    let feels_like = round1(temperature + rng.gen_range(-3.0..3.0));
    let condition = CONDITIONS[rng.gen_range(0..CONDITIONS.len())];

    Weather {
      location:       name.to_owned(),
      country:        country.to_owned(),
      temperature_c:  temperature,
      feels_like_c:   feels_like,
      humidity_pct:   round1(rng.gen_range(20.0..95.0)),
      pressure_hpa:   round1(rng.gen_range(980.0..1035.0)),
      visibility_km:  round1(rng.gen_range(2.0..10.0)),
      wind_speed_kmh: round1(rng.gen_range(0.0..40.0)),
      wind_deg:       round1(rng.gen_range(0.0..360.0)),
      condition:      condition.to_owned(),
      source:         WeatherOrigin::Simulated,
      is_fallback:    true,
    }
  }
}

fn round1(x: f64) -> f64 { (x * 10.0).round() / 10.0 }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn simulated_weather_is_tagged_and_plausible() {
    let fallback = RandomFallback::seeded(7);
    let w = fallback.simulate("Cairo,EG");

    assert_eq!(w.location, "Cairo");
    assert_eq!(w.country, "EG");
    assert_eq!(w.source, WeatherOrigin::Simulated);
    assert!(w.is_fallback);
    assert!((-5.0..35.0).contains(&w.temperature_c));
    assert!((20.0..95.0).contains(&w.humidity_pct));
    assert!((0.0..40.0).contains(&w.wind_speed_kmh));
    assert!(CONDITIONS.contains(&w.condition.as_str()));
  }

  #[test]
  fn same_seed_gives_same_reading() {
    let a = RandomFallback::seeded(42).simulate("Lima,PE");
    let b = RandomFallback::seeded(42).simulate("Lima,PE");
    assert_eq!(a, b);
  }

  #[test]
  fn bare_location_leaves_country_empty() {
    let w = RandomFallback::seeded(1).simulate("Lima");
    assert_eq!(w.location, "Lima");
    assert_eq!(w.country, "");
  }
}
