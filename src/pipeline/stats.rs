//! Serve Statistics Module
//!
//! Counts pipeline outcomes: artifacts generated, artifacts served from the
//! cache, and failures by kind.

use serde::Serialize;

use crate::error::ImageServerError;

// == Serve Stats ==
/// Pipeline outcome counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServeStats {
    /// Artifacts rendered and written to the cache
    pub generated: u64,
    /// Artifacts returned from an existing cache file
    pub served_from_cache: u64,
    /// Requests rejected by the parser
    pub invalid_url: u64,
    /// Requests whose source image could not be read
    pub image_not_found: u64,
    /// Requests rejected by the size resolver
    pub invalid_size: u64,
    /// Requests rejected by the quality resolver
    pub invalid_quality: u64,
    /// Engine or storage failures
    pub internal: u64,
}

impl ServeStats {
    // == Constructor ==
    /// Creates a new ServeStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Success ==
    pub fn record_success(&mut self, served_from_cache: bool) {
        if served_from_cache {
            self.served_from_cache += 1;
        } else {
            self.generated += 1;
        }
    }

    // == Record Failure ==
    /// Increments the counter for the error's kind.
    pub fn record_failure(&mut self, error: &ImageServerError) {
        match error {
            ImageServerError::InvalidUrl(_) => self.invalid_url += 1,
            ImageServerError::ImageNotFound(_) => self.image_not_found += 1,
            ImageServerError::InvalidSize(_) => self.invalid_size += 1,
            ImageServerError::InvalidQuality(_) => self.invalid_quality += 1,
            ImageServerError::Engine(_) | ImageServerError::Storage(_) => self.internal += 1,
        }
    }

    /// Total failed requests.
    pub fn failures(&self) -> u64 {
        self.invalid_url
            + self.image_not_found
            + self.invalid_size
            + self.invalid_quality
            + self.internal
    }

    /// Total requests handled.
    pub fn total_requests(&self) -> u64 {
        self.generated + self.served_from_cache + self.failures()
    }
}
