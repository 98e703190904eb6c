//! Quality Resolver Module
//!
//! Picks the encoding quality for a request.

use crate::error::{ImageServerError, Result};
use crate::resolve::Policy;

/// Resolves the requested quality against the policy.
///
/// An absent quality resolves to `policy.default_quality`. A present quality
/// must pass a non-empty quality whitelist; otherwise it is used as given.
///
/// # Errors
/// Returns `ImageServerError::InvalidQuality` when the whitelist rejects the
/// value, or when the value is 0 (no encoder accepts it).
pub fn resolve(requested: Option<u32>, policy: &Policy) -> Result<u32> {
    let Some(quality) = requested else {
        return Ok(policy.default_quality);
    };

    if quality == 0 {
        return Err(ImageServerError::InvalidQuality(
            "quality must be at least 1".to_string(),
        ));
    }

    if !policy.allows_quality(quality) {
        return Err(ImageServerError::InvalidQuality(format!(
            "{} is not an allowed quality",
            quality
        )));
    }

    Ok(quality)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_quality_uses_default() {
        assert_eq!(resolve(None, &Policy::default()).unwrap(), 90);

        let policy = Policy::default().with_default_quality(75);
        assert_eq!(resolve(None, &policy).unwrap(), 75);
    }

    #[test]
    fn test_default_bypasses_whitelist() {
        let policy = Policy::default().with_allowed_qualities([50]);
        assert_eq!(resolve(None, &policy).unwrap(), 90);
    }

    #[test]
    fn test_unrestricted_quality_passes() {
        assert_eq!(resolve(Some(37), &Policy::default()).unwrap(), 37);
    }

    #[test]
    fn test_whitelist_rejects_unlisted_quality() {
        let policy = Policy::default().with_allowed_qualities([60, 80]);
        assert_eq!(resolve(Some(80), &policy).unwrap(), 80);
        assert!(matches!(
            resolve(Some(70), &policy),
            Err(ImageServerError::InvalidQuality(_))
        ));
    }

    #[test]
    fn test_zero_quality_is_rejected() {
        assert!(matches!(
            resolve(Some(0), &Policy::default()),
            Err(ImageServerError::InvalidQuality(_))
        ));
    }
}
