//! Response DTOs for the image server API
//!
//! Defines the structure of outgoing JSON response bodies. Image responses
//! are raw bytes and have no DTO.

use serde::Serialize;

use crate::pipeline::ServeStats;

/// Failure counters by error kind
#[derive(Debug, Clone, Serialize)]
pub struct FailureCounts {
    pub invalid_url: u64,
    pub image_not_found: u64,
    pub invalid_size: u64,
    pub invalid_quality: u64,
    pub internal: u64,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Artifacts rendered and written to the cache
    pub generated: u64,
    /// Artifacts returned from an existing cache file
    pub served_from_cache: u64,
    /// Rejected or failed requests by kind
    pub failures: FailureCounts,
    /// All handled image requests
    pub total_requests: u64,
    /// served_from_cache / (generated + served_from_cache)
    pub cache_hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from serve statistics
    pub fn new(stats: &ServeStats) -> Self {
        let successes = stats.generated + stats.served_from_cache;
        let cache_hit_rate = if successes > 0 {
            stats.served_from_cache as f64 / successes as f64
        } else {
            0.0
        };
        Self {
            generated: stats.generated,
            served_from_cache: stats.served_from_cache,
            failures: FailureCounts {
                invalid_url: stats.invalid_url,
                image_not_found: stats.image_not_found,
                invalid_size: stats.invalid_size,
                invalid_quality: stats.invalid_quality,
                internal: stats.internal,
            },
            total_requests: stats.total_requests(),
            cache_hit_rate,
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
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    /// Stable error kind, e.g. `InvalidURL`
    pub kind: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(kind: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: kind.into(),
        }
    }
}
