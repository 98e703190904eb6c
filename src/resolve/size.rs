//! Size Resolver Module
//!
//! Computes the final output dimensions for a request from the requested
//! size, the source image's native size and the size whitelist.

use std::fmt;

use crate::error::{ImageServerError, Result};
use crate::resolve::Policy;

// == Dimensions ==
/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn exceeds(self, limit: u32) -> bool {
        self.width > limit || self.height > limit
    }
}

/// Formats as `WxH`, the form size whitelists are written in.
impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// == Resolve ==
/// Resolves the output size for a request.
///
/// Rules, first match wins:
/// 1. Pass-through (`WxH`, `Wx0`, `0xH` matching native, or `0x0`) yields the
///    native size and ignores the whitelist.
/// 2. A non-empty whitelist must contain the literal requested `WxH`.
/// 3. Width only: height follows the source aspect ratio.
/// 4. Height only: width follows the source aspect ratio.
/// 5. Both axes: used as given.
///
/// Resized outputs are bounded by `policy.max_dimension` on each axis.
///
/// # Errors
/// Returns `ImageServerError::InvalidSize` when the whitelist rejects the size,
/// a derived axis rounds to zero or either axis exceeds the maximum.
pub fn resolve(requested: Dimensions, native: Dimensions, policy: &Policy) -> Result<Dimensions> {
    if is_pass_through(requested, native) {
        return Ok(native);
    }

    if !policy.allows_size(&requested.to_string()) {
        return Err(ImageServerError::InvalidSize(format!(
            "{} is not an allowed size",
            requested
        )));
    }

    let resolved = match (requested.width, requested.height) {
        (width, 0) => Dimensions::new(width, scale(width, native.height, native.width)),
        (0, height) => Dimensions::new(scale(height, native.width, native.height), height),
        (width, height) => Dimensions::new(width, height),
    };

    if resolved.width == 0 || resolved.height == 0 {
        return Err(ImageServerError::InvalidSize(format!(
            "{} resolves to an empty image for a {} source",
            requested, native
        )));
    }

    if resolved.exceeds(policy.max_dimension) {
        return Err(ImageServerError::InvalidSize(format!(
            "{} resolves to {}, larger than {} on an axis",
            requested, resolved, policy.max_dimension
        )));
    }

    Ok(resolved)
}

fn is_pass_through(requested: Dimensions, native: Dimensions) -> bool {
    match (requested.width, requested.height) {
        (0, 0) => true,
        (width, 0) => width == native.width,
        (0, height) => height == native.height,
        _ => requested == native,
    }
}

/// `round(value * numerator / denominator)`, rounding halves up.
///
/// Computed in integers so the result is exact for every `u32` input. Values
/// beyond `u32::MAX` saturate.
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    let value = u128::from(value);
    let numerator = u128::from(numerator);
    let denominator = u128::from(denominator);
    let rounded = (2 * value * numerator + denominator) / (2 * denominator);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
