//! JSON REST API for starfuse.
//!
//! Exposes an axum [`Router`] generic over the trait seams in
//! `starfuse-core`. TLS and transport concerns are the caller's
//! responsibility.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET`  | `/fusion`  | [`fusion::handler`] |
//! | `POST` | `/store`   | [`store::handler`] |
//! | `GET`  | `/history` | [`history::handler`] |
//! | `GET`  | `/healthz` | [`health::handler`] |
//!
//! Every route sits behind the fixed-window rate limiter, request tracing,
//! a permissive CORS layer and the standard security headers.

pub mod envelope;
pub mod error;
pub mod fusion;
pub mod health;
pub mod history;
pub mod ratelimit;
pub mod store;

use std::sync::Arc;

use axum::{
  Router, middleware,
  http::{HeaderValue, header},
  routing::{get, post},
};
use starfuse_core::store::{CacheStore, CharacterSource, HistoryStore, WeatherSource};
use starfuse_fusion::{FusionService, HistoryQueryService};
use tower_http::{
  cors::{Any, CorsLayer},
  set_header::SetResponseHeaderLayer,
  trace::TraceLayer,
};

pub use error::ApiError;
pub use ratelimit::RateLimitConfig;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared per-request state: the two services, plus direct handles on the
/// stores the handlers and middleware need.
pub struct AppState<CS, WS, C, H> {
  pub fusion:        Arc<FusionService<CS, WS, C, H>>,
  pub history:       Arc<HistoryQueryService<H>>,
  pub history_store: Arc<H>,
  pub cache:         Arc<C>,
  pub rate:          RateLimitConfig,
}

// Manual impl so Clone is not bounded on the type parameters.
impl<CS, WS, C, H> Clone for AppState<CS, WS, C, H> {
  fn clone(&self) -> Self {
    AppState {
      fusion:        self.fusion.clone(),
      history:       self.history.clone(),
      history_store: self.history_store.clone(),
      cache:         self.cache.clone(),
      rate:          self.rate,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for `state`.
///
/// The returned `Router<()>` can be served directly or nested into a parent
/// router regardless of its own state type.
pub fn router<CS, WS, C, H>(state: AppState<CS, WS, C, H>) -> Router<()>
where
  CS: CharacterSource + 'static,
  WS: WeatherSource + 'static,
  C: CacheStore + 'static,
  H: HistoryStore + 'static,
{
  Router::new()
    .route("/fusion", get(fusion::handler::<CS, WS, C, H>))
    .route("/store", post(store::handler::<CS, WS, C, H>))
    .route("/history", get(history::handler::<CS, WS, C, H>))
    .route("/healthz", get(health::handler))
    .layer(middleware::from_fn_with_state(
      state.clone(),
      ratelimit::enforce::<CS, WS, C, H>,
    ))
    .layer(TraceLayer::new_for_http())
    .layer(
      CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any),
    )
    .layer(SetResponseHeaderLayer::overriding(
      header::X_CONTENT_TYPE_OPTIONS,
      HeaderValue::from_static("nosniff"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      header::X_FRAME_OPTIONS,
      HeaderValue::from_static("DENY"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      header::X_XSS_PROTECTION,
      HeaderValue::from_static("1; mode=block"),
    ))
    .with_state(state)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{collections::HashSet, time::Duration};

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use starfuse_core::{
    character::{Character, HomeworldRef, Planet},
    history::{NewRecord, RecordMeta},
    store::HistoryStore,
    weather::{Weather, WeatherOrigin},
  };
  use starfuse_fusion::{FusionConfig, FusionService, HistoryQueryService, RandomFallback};
  use starfuse_store_sqlite::SqliteStore;
  use tower::ServiceExt;

  use super::*;

  // ─── Stub upstreams ────────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("stub upstream failure")]
  struct StubFailure;

  /// Always returns a desert-dweller whose homeworld is planet 1.
  struct StubCharacters;

  impl CharacterSource for StubCharacters {
    type Error = StubFailure;

    async fn character(&self, id: u32) -> Result<Character, StubFailure> {
      Ok(Character {
        id,
        name: "Luke Skywalker".into(),
        height: Some(172.0),
        mass: Some(77.0),
        hair_color: "blond".into(),
        eye_color: "blue".into(),
        birth_year: "19BBY".into(),
        gender: "male".into(),
        homeworld: HomeworldRef {
          id:  Some(1),
          url: "https://swapi.example/planets/1/".into(),
        },
      })
    }

    async fn planet(&self, id: u32) -> Result<Planet, StubFailure> {
      Ok(Planet {
        id,
        name: "Tatooine".into(),
        climate: vec!["arid".into(), "desert".into()],
        terrain: vec!["desert".into()],
        population: Some(200_000.0),
      })
    }
  }

  /// Hot, clear weather: rates "perfect" against a desert climate.
  struct StubWeather;

  impl WeatherSource for StubWeather {
    type Error = StubFailure;

    async fn current(&self, location: &str) -> Result<Weather, StubFailure> {
      let (city, country) = location.split_once(',').unwrap_or((location, "??"));
      Ok(Weather {
        location:       city.to_owned(),
        country:        country.to_owned(),
        temperature_c:  31.0,
        feels_like_c:   33.0,
        humidity_pct:   18.0,
        pressure_hpa:   1011.0,
        visibility_km:  10.0,
        wind_speed_kmh: 14.0,
        wind_deg:       220.0,
        condition:      "clear sky".into(),
        source:         WeatherOrigin::Live,
        is_fallback:    false,
      })
    }
  }

  /// A cache whose every operation fails, for the fail-open path.
  struct BrokenCache;

  impl CacheStore for BrokenCache {
    type Error = StubFailure;

    async fn get(&self, _key: &str) -> Result<Option<Value>, StubFailure> {
      Err(StubFailure)
    }

    async fn set(
      &self,
      _key: &str,
      _value: Value,
      _ttl: Duration,
    ) -> Result<(), StubFailure> {
      Err(StubFailure)
    }
  }

  // ─── Harness ───────────────────────────────────────────────────────────────

  type TestState = AppState<StubCharacters, StubWeather, SqliteStore, SqliteStore>;

  async fn make_state(rate: RateLimitConfig) -> TestState {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let cache = Arc::new(store.clone());
    let history_store = Arc::new(store);
    let characters = Arc::new(StubCharacters);
    let weather = Arc::new(StubWeather);

    AppState {
      fusion: Arc::new(FusionService::new(
        characters,
        weather,
        cache.clone(),
        history_store.clone(),
        Box::new(RandomFallback::seeded(7)),
        FusionConfig::default(),
      )),
      history: Arc::new(HistoryQueryService::new(history_store.clone())),
      history_store,
      cache,
      rate,
    }
  }

  async fn get(state: &TestState, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  async fn post_store(state: &TestState, body: String) -> (StatusCode, Value) {
    let req = Request::builder()
      .method("POST")
      .uri("/store")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body))
      .unwrap();
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  // ─── /fusion ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn fusion_misses_then_hits_cache() {
    let state = make_state(RateLimitConfig::default()).await;

    let (status, first) = get(&state, "/fusion?character=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], json!(true));
    assert_eq!(first["meta"]["cached"], json!(false));
    assert_eq!(first["data"]["character"]["name"], json!("Luke Skywalker"));
    assert_eq!(first["data"]["homeworld"]["name"], json!("Tatooine"));
    assert_eq!(first["data"]["compatibility"], json!("perfect"));
    assert_eq!(first["data"]["dataQuality"]["weather"], json!("complete"));
    assert_eq!(first["data"]["weather"]["isFallback"], json!(false));

    let (status, second) = get(&state, "/fusion?character=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["meta"]["cached"], json!(true));
    assert_eq!(second["meta"]["processingTimeMs"], json!(0));
    assert_eq!(second["data"], first["data"]);
  }

  #[tokio::test]
  async fn fusion_requires_character_param() {
    let state = make_state(RateLimitConfig::default()).await;

    let (status, body) = get(&state, "/fusion").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert_eq!(body["error"]["details"]["field"], json!("character"));
  }

  #[tokio::test]
  async fn fusion_rejects_non_numeric_id() {
    let state = make_state(RateLimitConfig::default()).await;

    let (status, body) = get(&state, "/fusion?character=luke").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert_eq!(body["error"]["details"]["field"], json!("character"));
  }

  #[tokio::test]
  async fn fusion_writes_a_history_row() {
    let state = make_state(RateLimitConfig::default()).await;

    get(&state, "/fusion?character=4").await;
    let (status, body) = get(&state, "/history?source=fusion").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["count"], json!(1));
    assert_eq!(body["data"]["items"][0]["source"], json!("fusion"));
  }

  // ─── /store ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn store_creates_custom_record() {
    let state = make_state(RateLimitConfig::default()).await;

    let (status, body) = post_store(
      &state,
      json!({
        "data": { "note": "hello" },
        "metadata": { "origin": "test-suite" },
      })
      .to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["source"], json!("custom"));
    assert_eq!(body["data"]["payload"]["note"], json!("hello"));
    assert_eq!(body["data"]["meta"]["client"]["origin"], json!("test-suite"));
    assert!(body["data"]["id"].is_string());
  }

  #[tokio::test]
  async fn store_requires_data_field() {
    let state = make_state(RateLimitConfig::default()).await;

    let (status, body) =
      post_store(&state, json!({ "metadata": {} }).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert_eq!(body["error"]["details"]["field"], json!("data"));
  }

  #[tokio::test]
  async fn store_rejects_oversize_payload() {
    let state = make_state(RateLimitConfig::default()).await;

    let big = "x".repeat(1200);
    let (status, body) =
      post_store(&state, json!({ "data": big }).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field"], json!("data"));
  }

  #[tokio::test]
  async fn store_rejects_malformed_json() {
    let state = make_state(RateLimitConfig::default()).await;

    let (status, body) = post_store(&state, "{not json".to_owned()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert_eq!(body["error"]["details"]["field"], json!("body"));
  }

  // ─── /history ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn history_paginates_without_duplicates() {
    let state = make_state(RateLimitConfig::default()).await;

    for i in 0..7 {
      state
        .history_store
        .append(NewRecord::custom(json!({ "n": i }), RecordMeta::default()))
        .await
        .unwrap();
    }

    let mut seen = HashSet::new();
    let mut uri = "/history?source=custom&limit=3".to_owned();
    let mut pages = 0;
    loop {
      let (status, body) = get(&state, &uri).await;
      assert_eq!(status, StatusCode::OK);
      pages += 1;
      for item in body["data"]["items"].as_array().unwrap() {
        let id = item["id"].as_str().unwrap().to_owned();
        assert!(seen.insert(id), "duplicate record across pages");
      }
      if body["data"]["pagination"]["hasNext"] == json!(true) {
        let cursor = body["data"]["pagination"]["nextCursor"].as_str().unwrap();
        uri = format!("/history?source=custom&limit=3&lastEvaluatedKey={cursor}");
      } else {
        break;
      }
    }
    assert_eq!(seen.len(), 7);
    assert_eq!(pages, 3);
  }

  #[tokio::test]
  async fn history_rejects_bad_source() {
    let state = make_state(RateLimitConfig::default()).await;

    let (status, body) = get(&state, "/history?source=everything").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field"], json!("source"));
  }

  #[tokio::test]
  async fn history_echoes_filters() {
    let state = make_state(RateLimitConfig::default()).await;

    let (status, body) = get(&state, "/history?source=fusion&limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["filters"]["source"], json!("fusion"));
    assert_eq!(body["data"]["filters"]["limit"], json!(5));
  }

  // ─── Rate limiting ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn rate_limit_blocks_after_threshold() {
    let state = make_state(RateLimitConfig {
      limit:  2,
      window: Duration::from_secs(60),
    })
    .await;

    let (s1, _) = get(&state, "/healthz").await;
    let (s2, _) = get(&state, "/healthz").await;
    let (s3, body) = get(&state, "/healthz").await;
    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);
    assert_eq!(s3, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], json!("RATE_LIMIT_EXCEEDED"));
    assert_eq!(body["error"]["details"]["limit"], json!(2));

    // The counter is scoped to (ip, method, path): other routes still work.
    let (status, _) = get(&state, "/history").await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn rate_limit_window_resets() {
    let state = make_state(RateLimitConfig {
      limit:  1,
      window: Duration::from_millis(50),
    })
    .await;

    let (s1, _) = get(&state, "/healthz").await;
    let (s2, _) = get(&state, "/healthz").await;
    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::TOO_MANY_REQUESTS);

    tokio::time::sleep(Duration::from_millis(60)).await;
    let (s3, _) = get(&state, "/healthz").await;
    assert_eq!(s3, StatusCode::OK);
  }

  #[tokio::test]
  async fn rate_limiter_fails_open_when_cache_is_down() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let history_store = Arc::new(store);
    let cache = Arc::new(BrokenCache);
    let state = AppState {
      fusion: Arc::new(FusionService::new(
        Arc::new(StubCharacters),
        Arc::new(StubWeather),
        cache.clone(),
        history_store.clone(),
        Box::new(RandomFallback::seeded(7)),
        FusionConfig::default(),
      )),
      history: Arc::new(HistoryQueryService::new(history_store.clone())),
      history_store,
      cache,
      rate: RateLimitConfig {
        limit:  1,
        window: Duration::from_secs(60),
      },
    };

    for _ in 0..3 {
      let req = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();
      let resp = router(state.clone()).oneshot(req).await.unwrap();
      assert_eq!(resp.status(), StatusCode::OK);
    }
  }

  // ─── Layers ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn responses_carry_security_headers() {
    let state = make_state(RateLimitConfig::default()).await;

    let req = Request::builder()
      .uri("/healthz")
      .body(Body::empty())
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    let headers = resp.headers();
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(headers[header::X_XSS_PROTECTION], "1; mode=block");
  }
}
