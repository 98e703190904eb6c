//! API Module
//!
//! HTTP handlers and routing for the image server.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Pipeline outcome counters
//! - `GET /*path` - Resized image for a request path

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
