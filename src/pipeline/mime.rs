//! Extension to MIME type lookup.

/// Content type served for formats missing from the table
pub const FALLBACK_MIME: &str = "text/plain";

/// Returns the content type for a lowercased file extension.
pub fn resolve(format: &str) -> &'static str {
    match format {
        "ico" => "image/vnd.microsoft.icon",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "png" => "image/png",
        "webp" => "image/webp",
        "ief" => "image/ief",
        "pct" | "pic" | "pict" => "image/pict",
        "pgm" => "image/x-portable-graymap",
        "pbm" => "image/x-portable-bitmap",
        "pnm" => "image/x-portable-anymap",
        "ppm" => "image/x-portable-pixmap",
        "ras" => "image/x-cmu-raster",
        "rgb" => "image/x-rgb",
        "tif" | "tiff" => "image/tiff",
        "xpm" => "image/x-xpixmap",
        "xwd" => "image/x-xwindowdump",
        _ => FALLBACK_MIME,
    }
}
