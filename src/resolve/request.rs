//! Request Parser Module
//!
//! Turns a request path of the shape
//! `/<bucket>/<size>/<quality>?/<relative path>.<ext>` into a [`ParsedRequest`].
//!
//! The whole path must match; there are no partial matches. Size tokens that
//! overflow fall back to 0 for that axis instead of failing.

use crate::error::{ImageServerError, Result};
use crate::resolve::Dimensions;

/// Longest quality segment, in digits
const MAX_QUALITY_DIGITS: usize = 2;

// == Parsed Request ==
/// Structured form of an image request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// Requested width, 0 when unspecified
    pub requested_width: u32,
    /// Requested height, 0 when unspecified
    pub requested_height: u32,
    /// Requested quality, `None` when the segment is absent or empty
    pub requested_quality: Option<u32>,
    /// Source image path relative to the source root
    pub source_relative_path: String,
    /// Lowercased file extension
    pub format: String,
}

impl ParsedRequest {
    /// The requested size, 0 on an unspecified axis.
    pub fn requested_size(&self) -> Dimensions {
        Dimensions::new(self.requested_width, self.requested_height)
    }
}

// == Parse ==
/// Parses a request path.
///
/// # Errors
/// Returns `ImageServerError::InvalidUrl` when the path does not match the
/// request grammar.
pub fn parse(path: &str) -> Result<ParsedRequest> {
    let invalid = || ImageServerError::InvalidUrl(path.to_string());

    let rest = path.strip_prefix('/').ok_or_else(invalid)?;
    let segments: Vec<&str> = rest.split('/').collect();

    // bucket, size and at least one path segment
    if segments.len() < 3 {
        return Err(invalid());
    }

    let bucket = segments[0];
    if bucket.is_empty() || !bucket.chars().all(is_word_char) {
        return Err(invalid());
    }

    let (requested_width, requested_height) = parse_size(segments[1]).ok_or_else(invalid)?;

    let mut remaining = &segments[2..];
    let mut requested_quality = None;
    if remaining.len() > 1 && is_quality_segment(remaining[0]) {
        requested_quality = remaining[0].parse().ok();
        remaining = &remaining[1..];
    }

    let (dirs, file) = remaining.split_at(remaining.len() - 1);
    if dirs.iter().any(|segment| !is_path_segment(segment)) {
        return Err(invalid());
    }
    let file = file[0];
    if !is_path_segment(file) {
        return Err(invalid());
    }

    let (stem, ext) = file.rsplit_once('.').ok_or_else(invalid)?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(is_word_char) {
        return Err(invalid());
    }

    Ok(ParsedRequest {
        requested_width,
        requested_height,
        requested_quality,
        source_relative_path: remaining.join("/"),
        format: ext.to_lowercase(),
    })
}

/// Parses `W`, `WxH`, `xH`, `Wx` or the empty string.
///
/// Returns `None` if the segment contains anything besides digits and one `x`.
fn parse_size(segment: &str) -> Option<(u32, u32)> {
    let (width, height) = match segment.split_once('x') {
        Some((width, height)) => (width, height),
        None => (segment, ""),
    };

    if !is_digits(width) || !is_digits(height) {
        return None;
    }

    Some((lenient_axis(width), lenient_axis(height)))
}

/// Empty or overflowing tokens count as 0.
fn lenient_axis(token: &str) -> u32 {
    token.parse().unwrap_or(0)
}

fn is_digits(token: &str) -> bool {
    token.bytes().all(|b| b.is_ascii_digit())
}

fn is_quality_segment(segment: &str) -> bool {
    segment.len() <= MAX_QUALITY_DIGITS && is_digits(segment)
}

fn is_path_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".."
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
