//! Configuration Module
//!
//! Server settings come from environment variables. The resize policy comes
//! from an optional TOML file with an `[imageserver]` section, and each of its
//! keys can be overridden by an environment variable.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::resolve::{Dimensions, Policy};

/// Policy file read when `IMAGESERVER_CONFIG` is unset
pub const DEFAULT_POLICY_FILE: &str = "imageserver.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed policy file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid allowed-sizes entry '{0}', expected WxH")]
    InvalidSize(String),

    #[error("Invalid allowed-qualities entry '{0}'")]
    InvalidQuality(String),

    #[error("default-quality must be within 1..=100, got {0}")]
    DefaultQuality(u32),

    #[error("max-dimension must be at least 1")]
    MaxDimension,
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Path of the policy file
    pub policy_file: PathBuf,
    /// Interval in seconds between temp file sweeps of the cache root
    pub cleanup_interval: u64,
    /// Age in seconds after which an orphaned temp file is removed
    pub temp_file_max_age: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `IMAGESERVER_CONFIG` - Policy file path (default: imageserver.toml)
    /// - `CLEANUP_INTERVAL` - Temp file sweep frequency in seconds (default: 300)
    /// - `TEMP_FILE_MAX_AGE` - Orphaned temp file age in seconds (default: 600)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            policy_file: env::var("IMAGESERVER_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.policy_file),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
            temp_file_max_age: env::var("TEMP_FILE_MAX_AGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temp_file_max_age),
        }
    }

    /// Loads the policy file, applying environment overrides.
    pub fn load_policy(&self) -> Result<Policy, ConfigError> {
        load_policy(&self.policy_file, |key| env::var(key).ok())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            policy_file: PathBuf::from(DEFAULT_POLICY_FILE),
            cleanup_interval: 300,
            temp_file_max_age: 600,
        }
    }
}

// == Policy File ==
#[derive(Debug, Default, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    imageserver: PolicySection,
}

/// Raw `[imageserver]` keys; absent keys fall back to [`Policy::default`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PolicySection {
    images_path: Option<String>,
    cache_path: Option<String>,
    allowed_sizes: Option<String>,
    allowed_qualities: Option<String>,
    default_quality: Option<u32>,
    serve_cached: Option<bool>,
    max_dimension: Option<u32>,
}

impl PolicySection {
    /// Reads overrides through `lookup`, ignoring values that do not parse.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            images_path: lookup("IMAGES_PATH"),
            cache_path: lookup("CACHE_PATH"),
            allowed_sizes: lookup("ALLOWED_SIZES"),
            allowed_qualities: lookup("ALLOWED_QUALITIES"),
            default_quality: lookup("DEFAULT_QUALITY").and_then(|v| v.trim().parse().ok()),
            serve_cached: lookup("SERVE_CACHED").and_then(|v| v.trim().parse().ok()),
            max_dimension: lookup("MAX_DIMENSION").and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Keys set in `overrides` win.
    fn overridden_by(self, overrides: Self) -> Self {
        Self {
            images_path: overrides.images_path.or(self.images_path),
            cache_path: overrides.cache_path.or(self.cache_path),
            allowed_sizes: overrides.allowed_sizes.or(self.allowed_sizes),
            allowed_qualities: overrides.allowed_qualities.or(self.allowed_qualities),
            default_quality: overrides.default_quality.or(self.default_quality),
            serve_cached: overrides.serve_cached.or(self.serve_cached),
            max_dimension: overrides.max_dimension.or(self.max_dimension),
        }
    }

    fn into_policy(self) -> Result<Policy, ConfigError> {
        let defaults = Policy::default();

        let default_quality = self.default_quality.unwrap_or(defaults.default_quality);
        if !(1..=100).contains(&default_quality) {
            return Err(ConfigError::DefaultQuality(default_quality));
        }

        let max_dimension = self.max_dimension.unwrap_or(defaults.max_dimension);
        if max_dimension == 0 {
            return Err(ConfigError::MaxDimension);
        }

        let allowed_sizes = match self.allowed_sizes {
            Some(list) => parse_sizes(&list)?,
            None => Vec::new(),
        };
        let allowed_qualities = match self.allowed_qualities {
            Some(list) => parse_qualities(&list)?,
            None => Vec::new(),
        };

        Ok(Policy {
            source_root: self
                .images_path
                .map(PathBuf::from)
                .unwrap_or(defaults.source_root),
            cache_root: self
                .cache_path
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_root),
            allowed_sizes: allowed_sizes.into_iter().collect(),
            allowed_qualities: allowed_qualities.into_iter().collect(),
            default_quality,
            serve_cached: self.serve_cached.unwrap_or(defaults.serve_cached),
            max_dimension,
        })
    }
}

/// Loads a policy from `path`. A missing file yields the defaults, still
/// subject to the overrides returned by `lookup`.
pub fn load_policy(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Policy, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_policy(&contents, lookup)
}

/// Parses policy file contents and applies overrides.
pub fn parse_policy(
    contents: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Policy, ConfigError> {
    let file: PolicyFile = toml::from_str(contents)?;
    file.imageserver
        .overridden_by(PolicySection::from_lookup(lookup))
        .into_policy()
}

/// Parses a comma-separated `WxH` list into canonical `WxH` strings.
fn parse_sizes(list: &str) -> Result<Vec<String>, ConfigError> {
    comma_separated(list)
        .map(|entry| {
            let parsed = entry
                .split_once('x')
                .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)));
            match parsed {
                Some((w, h)) => Ok(Dimensions::new(w, h).to_string()),
                None => Err(ConfigError::InvalidSize(entry.to_string())),
            }
        })
        .collect()
}

fn parse_qualities(list: &str) -> Result<Vec<u32>, ConfigError> {
    comma_separated(list)
        .map(|entry| {
            entry
                .parse()
                .map_err(|_| ConfigError::InvalidQuality(entry.to_string()))
        })
        .collect()
}

fn comma_separated(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|entry| !entry.is_empty())
}
