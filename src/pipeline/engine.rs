//! Resize engine trait and the `image`-crate backed implementation.
//!
//! The [`ResizeEngine`] trait is the seam between the pipeline, which decides
//! *what* to produce, and the pixel work. [`RasterEngine`] is the production
//! implementation:
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe size and format | `image::ImageReader::with_guessed_format` + `into_dimensions` |
//! | Decode | `image::load_from_memory` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//! | Encode other formats | `DynamicImage::write_to` with the format's default encoder |

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

use crate::resolve::{Dimensions, ResolvedTarget};

#[derive(Error, Debug)]
pub enum EngineError {
    /// The source could not be read or is not a recognised image
    #[error("{0}")]
    Unreadable(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// A source image read from disk, not yet decoded.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Native pixel size
    pub dimensions: Dimensions,
    /// Detected container format, lowercased (e.g. `jpg`, `png`)
    pub format: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

/// Image backend used by the pipeline.
///
/// Implementations must be shareable across request threads.
pub trait ResizeEngine: Send + Sync {
    /// Read a source image and probe its native size.
    fn open(&self, path: &Path) -> Result<SourceImage, EngineError>;

    /// Produce the encoded output for `target` in the given output format
    /// (a lowercased file extension).
    fn render(
        &self,
        source: &SourceImage,
        target: &ResolvedTarget,
        format: &str,
    ) -> Result<Vec<u8>, EngineError>;
}

/// Pure Rust engine using the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterEngine;

impl RasterEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ResizeEngine for RasterEngine {
    fn open(&self, path: &Path) -> Result<SourceImage, EngineError> {
        let unreadable =
            |reason: String| EngineError::Unreadable(format!("{}: {}", path.display(), reason));

        let bytes = fs::read(path).map_err(|e| unreadable(e.to_string()))?;

        let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| unreadable(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| unreadable("unrecognised image format".to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| unreadable(e.to_string()))?;
        if width == 0 || height == 0 {
            return Err(unreadable("image has no pixels".to_string()));
        }

        Ok(SourceImage {
            dimensions: Dimensions::new(width, height),
            format: format_name(format),
            bytes,
        })
    }

    fn render(
        &self,
        source: &SourceImage,
        target: &ResolvedTarget,
        format: &str,
    ) -> Result<Vec<u8>, EngineError> {
        let output_format = ImageFormat::from_extension(format).ok_or_else(|| {
            EngineError::ProcessingFailed(format!("no encoder for .{}", format))
        })?;

        let img = image::load_from_memory(&source.bytes).map_err(|e| {
            EngineError::ProcessingFailed(format!("Failed to decode source: {}", e))
        })?;

        // Pass-through targets skip resampling
        let img = if target.dimensions() == source.dimensions {
            img
        } else {
            img.resize_exact(target.width(), target.height(), FilterType::Lanczos3)
        };

        encode(&img, output_format, target.quality())
    }
}

fn encode(img: &DynamicImage, format: ImageFormat, quality: u32) -> Result<Vec<u8>, EngineError> {
    let mut buf = Vec::new();
    let result = match format {
        ImageFormat::Jpeg => {
            let quality = u8::try_from(quality).unwrap_or(100);
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            // JPEG has no alpha channel
            DynamicImage::from(img.to_rgb8()).write_with_encoder(encoder)
        }
        other => img.write_to(&mut Cursor::new(&mut buf), other),
    };

    result.map_err(|e| {
        EngineError::ProcessingFailed(format!("{:?} encode failed: {}", format, e))
    })?;
    Ok(buf)
}

fn format_name(format: ImageFormat) -> String {
    format
        .extensions_str()
        .first()
        .copied()
        .unwrap_or("unknown")
        .to_string()
}
