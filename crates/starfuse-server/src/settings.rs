//! Runtime server configuration, deserialised from `config.toml` and the
//! `STARFUSE_` environment.
//!
//! Every field except `weather_api_key` has a working default, so a bare
//! `starfuse-server` starts up; without an API key the weather stage always
//! takes the simulated-fallback path.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,

  #[serde(default = "default_swapi_base_url")]
  pub swapi_base_url:      String,
  #[serde(default = "default_weather_base_url")]
  pub weather_base_url:    String,
  /// OpenWeatherMap API key. The only setting with no default; typically
  /// supplied as `STARFUSE_WEATHER_API_KEY`.
  #[serde(default)]
  pub weather_api_key:     Option<String>,

  /// TTL for cached fusion results, seconds.
  #[serde(default = "default_ttl_secs")]
  pub cache_ttl_secs:      u64,
  /// TTL for fusion history rows, seconds.
  #[serde(default = "default_ttl_secs")]
  pub history_ttl_secs:    u64,

  /// Requests allowed per rate-limit window per (ip, method, path).
  #[serde(default = "default_rate_limit")]
  pub rate_limit:          u32,
  #[serde(default = "default_rate_window_secs")]
  pub rate_window_secs:    u64,

  /// Interval between expired-row purge sweeps, seconds.
  #[serde(default = "default_purge_interval_secs")]
  pub purge_interval_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("starfuse.db") }
fn default_swapi_base_url() -> String { "https://swapi.py4e.com/api".to_owned() }
fn default_weather_base_url() -> String {
  "https://api.openweathermap.org/data/2.5".to_owned()
}
fn default_ttl_secs() -> u64 { 30 * 60 }
fn default_rate_limit() -> u32 { 100 }
fn default_rate_window_secs() -> u64 { 15 * 60 }
fn default_purge_interval_secs() -> u64 { 5 * 60 }
