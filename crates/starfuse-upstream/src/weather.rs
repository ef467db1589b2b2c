//! Client for the OpenWeatherMap current-weather endpoint.
//!
//! Requests metric units and converts the remaining non-metric fields
//! (wind in m/s, visibility in metres) so downstream code only sees
//! Celsius / km/h / km.

use reqwest::Client;
use serde::Deserialize;
use starfuse_core::{
  store::WeatherSource,
  weather::{Weather, WeatherOrigin},
};

use crate::{Error, Result, UPSTREAM_TIMEOUT};

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the live weather provider.
///
/// An absent API key is not a construction error: the client builds fine and
/// every call returns [`Error::MissingApiKey`], which the orchestrator
/// handles via the simulated-weather fallback. This lets the service start
/// in a degraded mode without credentials.
#[derive(Clone)]
pub struct WeatherClient {
  client:   Client,
  base_url: String,
  api_key:  Option<String>,
}

impl WeatherClient {
  pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(UPSTREAM_TIMEOUT)
      .build()
      .map_err(Error::ClientBuild)?;
    Ok(WeatherClient {
      client,
      base_url: base_url.into(),
      api_key,
    })
  }
}

impl WeatherSource for WeatherClient {
  type Error = Error;

  /// `GET /weather?q={location}&units=metric&appid={key}`
  async fn current(&self, location: &str) -> Result<Weather> {
    let key = self.api_key.as_deref().ok_or(Error::MissingApiKey)?;
    let url = format!("{}/weather", self.base_url.trim_end_matches('/'));
    tracing::debug!(location, "fetching current weather");

    let resp = self
      .client
      .get(&url)
      .query(&[("q", location), ("units", "metric"), ("appid", key)])
      .send()
      .await?;

    match resp.status() {
      s if s.is_success() => {
        let raw: RawWeather = resp.json().await?;
        Ok(raw.normalize())
      }
      s => Err(Error::Status { status: s, url }),
    }
  }
}

// ─── Wire DTOs ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawWeather {
  name:       String,
  sys:        RawSys,
  main:       RawMain,
  #[serde(default)]
  visibility: Option<f64>,
  wind:       RawWind,
  weather:    Vec<RawCondition>,
}

#[derive(Debug, Deserialize)]
struct RawSys {
  #[serde(default)]
  country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMain {
  temp:       f64,
  feels_like: f64,
  humidity:   f64,
  pressure:   f64,
}

#[derive(Debug, Deserialize)]
struct RawWind {
  /// Metres per second when `units=metric`.
  speed: f64,
  #[serde(default)]
  deg:   f64,
}

#[derive(Debug, Deserialize)]
struct RawCondition {
  description: String,
}

impl RawWeather {
  fn normalize(self) -> Weather {
    Weather {
      location:       self.name,
      country:        self.sys.country.unwrap_or_default(),
      temperature_c:  self.main.temp,
      feels_like_c:   self.main.feels_like,
      humidity_pct:   self.main.humidity,
      pressure_hpa:   self.main.pressure,
      // Provider reports metres; cap at the provider's own 10 km ceiling.
      visibility_km:  self.visibility.map(|m| m / 1000.0).unwrap_or(10.0),
      wind_speed_kmh: self.wind.speed * 3.6,
      wind_deg:       self.wind.deg,
      condition:      self
        .weather
        .into_iter()
        .next()
        .map(|c| c.description)
        .unwrap_or_default(),
      source:         WeatherOrigin::Live,
      is_fallback:    false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raw_weather_converts_units() {
    let raw = RawWeather {
      name:       "Cairo".into(),
      sys:        RawSys {
        country: Some("EG".into()),
      },
      main:       RawMain {
        temp:       31.2,
        feels_like: 33.0,
        humidity:   24.0,
        pressure:   1011.0,
      },
      visibility: Some(8000.0),
      wind:       RawWind {
        speed: 5.0,
        deg:   180.0,
      },
      weather:    vec![RawCondition {
        description: "clear sky".into(),
      }],
    };
    let w = raw.normalize();
    assert_eq!(w.wind_speed_kmh, 18.0);
    assert_eq!(w.visibility_km, 8.0);
    assert_eq!(w.country, "EG");
    assert_eq!(w.condition, "clear sky");
    assert_eq!(w.source, WeatherOrigin::Live);
    assert!(!w.is_fallback);
  }

  #[test]
  fn missing_optional_fields_get_defaults() {
    let raw = RawWeather {
      name:       "Nowhere".into(),
      sys:        RawSys { country: None },
      main:       RawMain {
        temp:       10.0,
        feels_like: 9.0,
        humidity:   50.0,
        pressure:   1000.0,
      },
      visibility: None,
      wind:       RawWind {
        speed: 0.0,
        deg:   0.0,
      },
      weather:    vec![],
    };
    let w = raw.normalize();
    assert_eq!(w.visibility_km, 10.0);
    assert_eq!(w.country, "");
    assert_eq!(w.condition, "");
  }

  #[tokio::test]
  async fn missing_api_key_fails_fast() {
    let client = WeatherClient::new("https://api.openweathermap.org/data/2.5", None).unwrap();
    let err = client.current("Cairo,EG").await.unwrap_err();
    assert!(matches!(err, Error::MissingApiKey));
  }
}
