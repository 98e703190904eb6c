//! Pipeline Module
//!
//! Orchestrates a single image request: parse, load the source, resolve size
//! and quality, render, persist to the cache and pick the content type.
//!
//! Every step runs synchronously on the calling thread and nothing is
//! retried; the first failure is returned to the caller unchanged.

mod engine;
pub mod mime;
mod stats;
mod store;

// Re-export public types
pub use engine::{EngineError, RasterEngine, ResizeEngine, SourceImage};
pub use stats::ServeStats;
pub use store::{CacheStore, TEMP_FILE_PREFIX};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ImageServerError, Result};
use crate::resolve::{self, locator, request, Policy, ResolvedTarget};

// == Cache Artifact ==
/// A servable artifact produced for one request.
#[derive(Debug, Clone)]
pub struct CacheArtifact {
    /// Where the artifact lives in the cache
    pub storage_path: PathBuf,
    /// Content type for the response
    pub mime_type: &'static str,
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// Size and quality the artifact was produced at
    pub target: ResolvedTarget,
    /// Whether an existing cache file was returned instead of rendering
    pub served_from_cache: bool,
}

// == Pipeline ==
/// Request-to-artifact orchestrator.
///
/// Holds only the read-only policy, the engine and the cache writer; it is
/// shared by every request thread.
pub struct Pipeline {
    policy: Arc<Policy>,
    engine: Arc<dyn ResizeEngine>,
    store: CacheStore,
}

impl Pipeline {
    // == Constructor ==
    pub fn new(policy: Arc<Policy>, engine: Arc<dyn ResizeEngine>) -> Self {
        Self {
            policy,
            engine,
            store: CacheStore::new(),
        }
    }

    /// Creates a pipeline backed by the `image` crate engine.
    pub fn with_raster_engine(policy: Policy) -> Self {
        Self::new(Arc::new(policy), Arc::new(RasterEngine::new()))
    }

    // == Run ==
    /// Produces the artifact for a request path.
    ///
    /// # Errors
    /// `InvalidUrl`, `ImageNotFound`, `InvalidSize` and `InvalidQuality` for
    /// rejected requests; `Engine` and `Storage` for render or cache failures.
    pub fn run(&self, request_path: &str) -> Result<CacheArtifact> {
        let parsed = request::parse(request_path)?;

        let source_path = self.policy.source_root.join(&parsed.source_relative_path);
        let source = self
            .engine
            .open(&source_path)
            .map_err(|e| ImageServerError::ImageNotFound(e.to_string()))?;

        let target = resolve::resolve_target(&parsed, source.dimensions, &self.policy)?;
        debug!(
            "Resolved {} ({}x{} {}) to {}x{} q{}",
            request_path,
            source.dimensions.width,
            source.dimensions.height,
            source.format,
            target.width(),
            target.height(),
            target.quality()
        );

        let storage_path = locator::locate(&self.policy.cache_root, request_path);

        let (bytes, served_from_cache) = self.store.with_exclusive(&storage_path, || {
            self.produce(&source, &target, &parsed.format, &storage_path)
        })?;

        if !served_from_cache {
            info!(
                "Generated {} ({} bytes)",
                storage_path.display(),
                bytes.len()
            );
        }

        Ok(CacheArtifact {
            storage_path,
            mime_type: mime::resolve(&parsed.format),
            bytes,
            target,
            served_from_cache,
        })
    }

    /// Renders and persists the artifact, or returns the cached one when the
    /// policy allows it. Must run under the storage path's guard.
    fn produce(
        &self,
        source: &SourceImage,
        target: &ResolvedTarget,
        format: &str,
        storage_path: &Path,
    ) -> Result<(Vec<u8>, bool)> {
        if self.policy.serve_cached {
            if let Some(bytes) = self.store.read(storage_path)? {
                return Ok((bytes, true));
            }
        }

        let bytes = self
            .engine
            .render(source, target, format)
            .map_err(|e| ImageServerError::Engine(e.to_string()))?;
        self.store.write(storage_path, &bytes)?;
        Ok((bytes, false))
    }
}
