//! Response DTOs for the demo server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the sample endpoints (GET /samples, GET /samples/:id)
///
/// Instances are what the cache stores, so an unchanged `generated_at`
/// across requests shows the producer did not run again.
#[derive(Debug, Clone, Serialize)]
pub struct SampleResponse {
    /// Composite cache key the values are memoized under
    pub key: String,
    /// The memoized values
    pub values: Vec<String>,
    /// When the producer built these values
    pub generated_at: DateTime<Utc>,
}

impl SampleResponse {
    /// Creates a new SampleResponse stamped with the current time
    pub fn new(key: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            key: key.into(),
            values,
            generated_at: Utc::now(),
        }
    }
}

/// Response body for GET /samples/:id/exists
#[derive(Debug, Clone, Serialize)]
pub struct ExistsResponse {
    /// Composite cache key that was checked
    pub key: String,
    /// Whether a live entry is cached
    pub exists: bool,
}

impl ExistsResponse {
    /// Creates a response for the checked key.
    pub fn new(key: impl Into<String>, exists: bool) -> Self {
        Self {
            key: key.into(),
            exists,
        }
    }
}

/// Response body for DELETE /samples/:id
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    /// Success message
    pub message: String,
    /// Composite cache key that was removed
    pub key: String,
}

impl RemoveResponse {
    /// Creates a new RemoveResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed", key),
            key,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of producer runs whose value was kept
    pub computations: u64,
    /// Number of failed producer runs
    pub producer_failures: u64,
    /// Number of expired entries reclaimed
    pub expired_reclaimed: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            computations: stats.computations,
            producer_failures: stats.producer_failures,
            expired_reclaimed: stats.expired_reclaimed,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
