//! starfuse server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, wires the upstream clients into the fusion
//! pipeline, and serves the JSON API over HTTP.

mod settings;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use starfuse_api::{AppState, RateLimitConfig};
use starfuse_fusion::{FusionConfig, FusionService, HistoryQueryService, RandomFallback};
use starfuse_store_sqlite::SqliteStore;
use starfuse_upstream::{SwapiClient, WeatherClient};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Star Wars + weather fusion API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("STARFUSE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.weather_api_key.is_none() {
    tracing::warn!(
      "no weather API key configured; all weather data will be simulated"
    );
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let cache = Arc::new(store.clone());
  let history_store = Arc::new(store.clone());

  let characters = Arc::new(
    SwapiClient::new(&server_cfg.swapi_base_url)
      .context("failed to build character client")?,
  );
  let weather = Arc::new(
    WeatherClient::new(
      &server_cfg.weather_base_url,
      server_cfg.weather_api_key.clone(),
    )
    .context("failed to build weather client")?,
  );

  let fusion = FusionService::new(
    characters,
    weather,
    cache.clone(),
    history_store.clone(),
    Box::new(RandomFallback::new()),
    FusionConfig {
      cache_ttl:   Duration::from_secs(server_cfg.cache_ttl_secs),
      history_ttl: Duration::from_secs(server_cfg.history_ttl_secs),
    },
  );

  let state = AppState {
    fusion: Arc::new(fusion),
    history: Arc::new(HistoryQueryService::new(history_store.clone())),
    history_store,
    cache,
    rate: RateLimitConfig {
      limit:  server_cfg.rate_limit,
      window: Duration::from_secs(server_cfg.rate_window_secs),
    },
  };

  spawn_purge_task(store, Duration::from_secs(server_cfg.purge_interval_secs));

  let app = starfuse_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Periodically delete expired cache entries and history rows. SQLite has no
/// TTL of its own; reads already filter expired rows, this just reclaims the
/// space.
fn spawn_purge_task(store: SqliteStore, interval: Duration) {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      match store.purge_expired().await {
        Ok((cache, history)) if cache > 0 || history > 0 => {
          tracing::debug!(cache, history, "purged expired rows");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "purge sweep failed"),
      }
    }
  });
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
