//! Resolved Target Module
//!
//! The validated output size and quality of a request.

use crate::error::{ImageServerError, Result};
use crate::resolve::Dimensions;

// == Resolved Target ==
/// Final width, height and quality used to produce an artifact.
///
/// Both dimensions are non-zero and quality lies in `1..=100`; the only
/// constructor enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    width: u32,
    height: u32,
    quality: u32,
}

impl ResolvedTarget {
    /// Builds a target from resolved dimensions and quality.
    ///
    /// # Errors
    /// `InvalidSize` for an empty dimension, `InvalidQuality` for a quality
    /// outside `1..=100`.
    pub fn new(size: Dimensions, quality: u32) -> Result<Self> {
        if size.width == 0 || size.height == 0 {
            return Err(ImageServerError::InvalidSize(format!(
                "{}x{} has an empty dimension",
                size.width, size.height
            )));
        }
        if !(1..=100).contains(&quality) {
            return Err(ImageServerError::InvalidQuality(format!(
                "{} is outside 1..=100",
                quality
            )));
        }
        Ok(Self {
            width: size.width,
            height: size.height,
            quality,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn quality(&self) -> u32 {
        self.quality
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}
