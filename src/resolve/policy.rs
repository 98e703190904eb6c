//! Resize Policy Module
//!
//! The process-wide, read-only rules every request is resolved against.

use std::collections::BTreeSet;
use std::path::PathBuf;

// == Public Constants ==
/// Quality used when neither the request nor the policy file sets one
pub const DEFAULT_QUALITY: u32 = 90;

/// Cache root used when none is configured
pub const DEFAULT_CACHE_ROOT: &str = "cache";

/// Largest output axis, in pixels, a resize may produce
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

// == Policy ==
/// Immutable resize policy, loaded once at startup.
///
/// Empty whitelists mean "no restriction".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Directory source images are read from
    pub source_root: PathBuf,
    /// Directory generated artifacts are written under
    pub cache_root: PathBuf,
    /// Permitted `WxH` size strings, compared literally
    pub allowed_sizes: BTreeSet<String>,
    /// Permitted quality values
    pub allowed_qualities: BTreeSet<u32>,
    /// Quality applied when the request omits one
    pub default_quality: u32,
    /// Serve an existing artifact instead of regenerating it
    pub serve_cached: bool,
    /// Upper bound on each axis of a resized output
    pub max_dimension: u32,
}

impl Policy {
    // == Constructor ==
    /// Creates an unrestricted policy over the given roots.
    pub fn new(source_root: impl Into<PathBuf>, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            cache_root: cache_root.into(),
            ..Self::default()
        }
    }

    /// Restricts requests to the given `WxH` size strings.
    pub fn with_allowed_sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts requests to the given quality values.
    pub fn with_allowed_qualities(mut self, qualities: impl IntoIterator<Item = u32>) -> Self {
        self.allowed_qualities = qualities.into_iter().collect();
        self
    }

    pub fn with_default_quality(mut self, quality: u32) -> Self {
        self.default_quality = quality;
        self
    }

    pub fn with_serve_cached(mut self, serve_cached: bool) -> Self {
        self.serve_cached = serve_cached;
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Returns true if `size` (a `WxH` string) passes the size whitelist.
    pub fn allows_size(&self, size: &str) -> bool {
        self.allowed_sizes.is_empty() || self.allowed_sizes.contains(size)
    }

    /// Returns true if `quality` passes the quality whitelist.
    pub fn allows_quality(&self, quality: u32) -> bool {
        self.allowed_qualities.is_empty() || self.allowed_qualities.contains(&quality)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            cache_root: PathBuf::from(DEFAULT_CACHE_ROOT),
            allowed_sizes: BTreeSet::new(),
            allowed_qualities: BTreeSet::new(),
            default_quality: DEFAULT_QUALITY,
            serve_cached: false,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}
