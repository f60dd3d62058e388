//! API Handlers
//!
//! HTTP request handlers for the demo server. The sample endpoints memoize
//! their payloads, one through the synchronous path and one through the
//! asynchronous path with a key parameter.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{compose_key, CacheKeyParameter, MemoizingCache, TypedCache};
use crate::error::{CacheError, Result};
use crate::models::{
    ExistsResponse, HealthResponse, RemoveResponse, SampleResponse, StatsResponse,
};

/// Base key of the sample list
pub const SAMPLES_KEY: &str = "samples_list";

/// Base key of samples looked up by id
pub const SAMPLES_BY_ID_KEY: &str = "samples_by_id";

/// Highest sample id the producer knows about
pub const MAX_SAMPLE_ID: u32 = 10_000;

/// Simulated latency of the sample backend
const SAMPLE_LOAD_DELAY: Duration = Duration::from_millis(50);

/// Application state shared across all handlers.
///
/// The cache is built once in `main` and handed to every handler; the typed
/// views share its storage.
#[derive(Clone)]
pub struct AppState {
    /// Shared memoizing cache
    pub cache: Arc<MemoizingCache>,
    /// Memoized sample list
    pub samples: TypedCache<SampleResponse>,
    /// Memoized samples by id
    pub samples_by_id: TypedCache<SampleResponse>,
}

impl AppState {
    /// Creates a new AppState over `cache`, memoizing for `ttl_minutes`.
    pub fn new(cache: Arc<MemoizingCache>, ttl_minutes: u32) -> Self {
        Self {
            samples: TypedCache::new(cache.clone(), SAMPLES_KEY, ttl_minutes),
            samples_by_id: TypedCache::new(cache.clone(), SAMPLES_BY_ID_KEY, ttl_minutes),
            cache,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(Arc::new(MemoizingCache::new()), config.default_ttl_minutes)
    }
}

/// Handler for GET /samples
///
/// Memoized through the synchronous path on a blocking thread.
pub async fn samples_handler(State(state): State<AppState>) -> Result<Json<SampleResponse>> {
    let samples = state.samples.clone();
    let response = tokio::task::spawn_blocking(move || {
        samples.get_or_compute(
            || SampleResponse::new(SAMPLES_KEY, vec!["value1".into(), "value2".into()]),
            &[],
        )
    })
    .await
    .map_err(|e| CacheError::Internal(e.to_string()))?;

    Ok(Json(response))
}

/// Handler for GET /samples/:id
///
/// Memoized through the asynchronous path; unknown ids are not cached.
pub async fn sample_by_id_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SampleResponse>> {
    let id = parse_id(&id)?;
    let params = [CacheKeyParameter::new("id", id)];
    let key = compose_key(SAMPLES_BY_ID_KEY, &params);

    let response = state
        .samples_by_id
        .try_get_or_compute_async(|| load_sample(key, id), &params)
        .await?;

    Ok(Json(response))
}

/// Handler for GET /samples/:id/exists
pub async fn sample_exists_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExistsResponse>> {
    let params = [CacheKeyParameter::new("id", parse_id(&id)?)];
    let exists = state.samples_by_id.exists(&params);

    Ok(Json(ExistsResponse::new(
        compose_key(SAMPLES_BY_ID_KEY, &params),
        exists,
    )))
}

/// Handler for DELETE /samples/:id
///
/// Succeeds whether or not the sample was cached.
pub async fn remove_sample_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemoveResponse>> {
    let params = [CacheKeyParameter::new("id", parse_id(&id)?)];
    state.samples_by_id.remove(&params);

    Ok(Json(RemoveResponse::new(compose_key(
        SAMPLES_BY_ID_KEY,
        &params,
    ))))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

fn parse_id(raw: &str) -> Result<u32> {
    raw.parse()
        .map_err(|_| CacheError::InvalidRequest(format!("Invalid sample id '{}'", raw)))
}

/// Stand-in for a slow backend lookup.
async fn load_sample(key: String, id: u32) -> Result<SampleResponse> {
    tokio::time::sleep(SAMPLE_LOAD_DELAY).await;

    if id == 0 || id > MAX_SAMPLE_ID {
        return Err(CacheError::NotFound(format!("No sample with id {}", id)));
    }

    Ok(SampleResponse::new(
        key,
        vec![format!("value{}", id * 2 + 1), format!("value{}", id * 2 + 2)],
    ))
}
