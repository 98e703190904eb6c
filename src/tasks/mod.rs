//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Temp file cleanup: removes orphaned cache temp files at configured intervals

mod cleanup;

pub use cleanup::{spawn_cleanup_task, sweep_temp_files};
