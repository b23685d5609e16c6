//! Source classifier
//!
//! Pure classification by explicit file extension only; no content sniffing.
//! Text sources are always encodings, image byte sources are always images.
//! An unrecognized extension rejects the source without aborting the batch.

use crate::error::{ImportError, ImportResult};
use crate::types::{ImportSource, SourceKind};
use std::path::Path;

/// Extension of single-vibe native files
pub const VIBE_EXTENSION: &str = "vibe";

/// Extension of multi-vibe bundle files
pub const BUNDLE_EXTENSION: &str = "vibebundle";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// Determine which extraction path applies to a source
pub fn classify(source: &ImportSource) -> ImportResult<SourceKind> {
    match source {
        ImportSource::File { path } => classify_path(path),
        ImportSource::Image { .. } => Ok(SourceKind::Image),
        ImportSource::Encoding { .. } => Ok(SourceKind::Encoding),
    }
}

fn classify_path(path: &Path) -> ImportResult<SourceKind> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if extension == VIBE_EXTENSION {
        Ok(SourceKind::NativeFile)
    } else if extension == BUNDLE_EXTENSION {
        Ok(SourceKind::NativeBundle)
    } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(SourceKind::Image)
    } else {
        Err(ImportError::UnsupportedFormat(path.display().to_string()))
    }
}
