//! Response models for the image server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing JSON response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{ErrorResponse, FailureCounts, HealthResponse, StatsResponse};
