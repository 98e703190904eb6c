//! API Handlers
//!
//! HTTP request handlers for the image server endpoints.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::State,
    http::{header, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::error::{ImageServerError, Result};
use crate::models::{HealthResponse, StatsResponse};
use crate::pipeline::{CacheArtifact, Pipeline, ServeStats};
use crate::resolve::Policy;

/// Application state shared across all handlers.
///
/// The pipeline is immutable and shared as-is; only the counters sit behind
/// a lock.
#[derive(Clone)]
pub struct AppState {
    /// Request-to-artifact pipeline
    pub pipeline: Arc<Pipeline>,
    /// Outcome counters
    pub stats: Arc<RwLock<ServeStats>>,
}

impl AppState {
    /// Creates a new AppState around the given pipeline.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            stats: Arc::new(RwLock::new(ServeStats::new())),
        }
    }

    /// Creates a new AppState with the `image`-backed engine.
    pub fn from_policy(policy: Policy) -> Self {
        Self::new(Pipeline::with_raster_engine(policy))
    }
}

/// Handler for GET /<bucket>/<size>/<quality>?/<path>.<ext>
///
/// Runs the pipeline on the blocking pool and serves the artifact bytes with
/// their content type. Failures are answered with the status of their kind.
pub async fn image_handler(State(state): State<AppState>, uri: Uri) -> Result<Response> {
    let request_path = uri.path().to_string();
    let pipeline = state.pipeline.clone();

    let result = {
        let request_path = request_path.clone();
        tokio::task::spawn_blocking(move || pipeline.run(&request_path))
            .await
            .unwrap_or_else(|e| {
                Err(ImageServerError::Engine(format!(
                    "pipeline task failed: {}",
                    e
                )))
            })
    };

    let mut stats = state.stats.write().await;
    match result {
        Ok(artifact) => {
            stats.record_success(artifact.served_from_cache);
            Ok(artifact_response(artifact))
        }
        Err(err) => {
            stats.record_failure(&err);
            warn!("Rejected {} ({}): {}", request_path, err.kind(), err);
            Err(err)
        }
    }
}

fn artifact_response(artifact: CacheArtifact) -> Response {
    ([(header::CONTENT_TYPE, artifact.mime_type)], artifact.bytes).into_response()
}

/// Handler for GET /stats
///
/// Returns pipeline outcome counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.stats.read().await;
    Json(StatsResponse::new(&stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
