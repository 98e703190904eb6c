//! Image Server - on-demand image resizing with a disk cache
//!
//! Requests like `/thumb/200x150/85/cat.jpg` are parsed, checked against the
//! configured policy, resized, and stored under a cache path that mirrors the
//! request.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod resolve;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::ImageServerError;
pub use pipeline::{CacheArtifact, Pipeline};
pub use resolve::Policy;
pub use tasks::spawn_cleanup_task;
