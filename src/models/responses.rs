//! Response DTOs for the HTTP facade
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for `GET /suggest`
#[derive(Debug, Clone, Serialize)]
pub struct SuggestResponse {
    pub query: String,
    pub terms: Vec<String>,
}

impl SuggestResponse {
    pub fn new(query: impl Into<String>, terms: Vec<String>) -> Self {
        Self {
            query: query.into(),
            terms,
        }
    }
}

/// Response body for `DELETE /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub key: String,
    pub fuzzy: bool,
    /// Whether anything was removed
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>, fuzzy: bool, deleted: bool) -> Self {
        Self {
            key: key.into(),
            fuzzy,
            deleted,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when storage is unavailable
    pub status: String,
    pub storage_available: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn new(storage_available: bool) -> Self {
        let status = if storage_available { "healthy" } else { "degraded" };
        Self {
            status: status.to_string(),
            storage_available,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
