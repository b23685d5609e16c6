//! Thumbnail generation
//!
//! References imported from raw image bytes get a small PNG preview so the
//! library grid never has to decode full-size images.

use crate::error::{ImportError, ImportResult};
use image::imageops::FilterType;
use std::io::Cursor;

/// Decode image bytes and produce a PNG thumbnail bounded by `max_edge`
///
/// Images already within bounds are re-encoded without resizing.
pub fn make_thumbnail(image_bytes: &[u8], max_edge: u32) -> ImportResult<Vec<u8>> {
    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| ImportError::Extraction(format!("Image decode failed: {}", e)))?;

    let thumbnail = if decoded.width() > max_edge || decoded.height() > max_edge {
        decoded.resize(max_edge, max_edge, FilterType::Lanczos3)
    } else {
        decoded
    };

    let mut out = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| ImportError::Extraction(format!("Thumbnail encode failed: {}", e)))?;

    Ok(out.into_inner())
}
