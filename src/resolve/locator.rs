//! Cache Locator Module
//!
//! Maps a request path to the file its artifact is stored in.
//!
//! The storage path is the cache root joined with the unmodified request
//! path, so size and quality segments are part of the cache key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Derives the storage path for a request path.
///
/// Leading slashes on the request path are stripped so the result always
/// stays under `cache_root`. The request path is expected to have passed the
/// request parser, which rejects `.` and `..` segments.
pub fn locate(cache_root: &Path, request_path: &str) -> PathBuf {
    cache_root.join(request_path.trim_start_matches('/'))
}

/// Creates the parent directories of `storage_path`.
///
/// Succeeds if they already exist.
pub fn prepare(storage_path: &Path) -> io::Result<()> {
    match storage_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_mirrors_request_path() {
        let path = locate(Path::new("/cache"), "/thumb/200x150/85/cat.jpg");
        assert_eq!(path, PathBuf::from("/cache/thumb/200x150/85/cat.jpg"));
    }

    #[test]
    fn test_locate_keeps_size_and_quality_in_key() {
        let small = locate(Path::new("cache"), "/thumb/100/cat.jpg");
        let large = locate(Path::new("cache"), "/thumb/200/cat.jpg");
        assert_ne!(small, large);
    }

    #[test]
    fn test_locate_is_deterministic() {
        let a = locate(Path::new("cache"), "/thumb/200//cat.jpg");
        let b = locate(Path::new("cache"), "/thumb/200//cat.jpg");
        assert_eq!(a, b);
        assert!(a.starts_with("cache"));
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = locate(tmp.path(), "/thumb/200x150/85/albums/cat.jpg");

        prepare(&path).unwrap();
        prepare(&path).unwrap();

        assert!(path.parent().unwrap().is_dir());
    }
}
