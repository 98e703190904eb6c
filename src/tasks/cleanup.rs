//! Temp File Cleanup Task
//!
//! Background task that periodically removes temp files orphaned by cache
//! writes that never completed (for example after a crash mid-write).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::pipeline::TEMP_FILE_PREFIX;

/// Spawns a background task that periodically sweeps orphaned temp files.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Each sweep walks the cache root on the blocking pool.
///
/// # Arguments
/// * `cache_root` - Directory artifacts are written under
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
/// * `max_age_secs` - Minimum age of a temp file before it is removed
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cleanup_handle = spawn_cleanup_task(PathBuf::from("cache"), 300, 600);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(
    cache_root: PathBuf,
    cleanup_interval_secs: u64,
    max_age_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);
    let max_age = Duration::from_secs(max_age_secs);

    tokio::spawn(async move {
        info!(
            "Starting temp file cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let root = cache_root.clone();
            let removed =
                match tokio::task::spawn_blocking(move || sweep_temp_files(&root, max_age)).await {
                    Ok(removed) => removed,
                    Err(e) => {
                        warn!("Temp file cleanup failed: {}", e);
                        continue;
                    }
                };

            if removed > 0 {
                info!("Temp file cleanup: removed {} orphaned files", removed);
            } else {
                debug!("Temp file cleanup: no orphaned files found");
            }
        }
    })
}

/// Removes temp files under `cache_root` last modified at least `max_age` ago.
///
/// Returns the number of files removed. A missing cache root is not an error.
pub fn sweep_temp_files(cache_root: &Path, max_age: Duration) -> usize {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in WalkDir::new(cache_root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file()
            || !entry
                .file_name()
                .to_string_lossy()
                .starts_with(TEMP_FILE_PREFIX)
        {
            continue;
        }

        let age = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .map(|modified| now.duration_since(modified).unwrap_or(Duration::ZERO));
        if !matches!(age, Some(age) if age >= max_age) {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to remove {}: {}", entry.path().display(), e),
        }
    }

    removed
}
