//! Embedded image metadata
//!
//! Shareable vibe images carry the native JSON payload in a PNG text chunk
//! under the `vibe-transfer` keyword. Probing looks at tEXt, zTXt and iTXt
//! chunks; anything that is not a readable PNG, or has no such chunk, simply
//! has no embedded data and routes to encoding-on-demand.

use crate::error::{ImportError, ImportResult};
use crate::types::{SourceType, VibeReference};
use crate::services::vibe_file;
use std::io::Cursor;

/// Text-chunk keyword carrying the vibe payload
pub const METADATA_KEYWORD: &str = "vibe-transfer";

/// Probe image bytes for embedded vibe metadata
///
/// Returns `Ok(None)` when the bytes are not a PNG, cannot be decoded, or
/// carry no payload chunk; that is the no-embedded-data signal, not an
/// error. A payload chunk that is present but unreadable is an extraction
/// failure.
pub fn probe_embedded(bytes: &[u8]) -> ImportResult<Option<Vec<VibeReference>>> {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let mut reader = match decoder.read_info() {
        Ok(reader) => reader,
        Err(_) => return Ok(None),
    };

    if let Some(payload) = find_payload_text(reader.info()) {
        return decode_payload(&payload).map(Some);
    }

    // Text chunks may trail the image data; decode one frame and re-check
    let mut buf = vec![0; reader.output_buffer_size()];
    if reader.next_frame(&mut buf).is_ok() {
        if let Some(payload) = find_payload_text(reader.info()) {
            return decode_payload(&payload).map(Some);
        }
    }

    Ok(None)
}

fn find_payload_text(info: &png::Info<'_>) -> Option<String> {
    for t in &info.uncompressed_latin1_text {
        if t.keyword.eq_ignore_ascii_case(METADATA_KEYWORD) {
            return Some(t.text.clone());
        }
    }
    for t in &info.compressed_latin1_text {
        if t.keyword.eq_ignore_ascii_case(METADATA_KEYWORD) {
            if let Ok(text) = t.get_text() {
                return Some(text);
            }
        }
    }
    for t in &info.utf8_text {
        if t.keyword.eq_ignore_ascii_case(METADATA_KEYWORD) {
            if let Ok(text) = t.get_text() {
                return Some(text);
            }
        }
    }
    None
}

fn decode_payload(payload: &str) -> ImportResult<Vec<VibeReference>> {
    // The chunk was present, so failures here are extraction errors rather
    // than a missing-data signal
    vibe_file::parse_native(payload.as_bytes(), SourceType::EmbeddedImage)
        .map_err(|e| ImportError::Extraction(format!("Embedded payload unreadable: {}", e)))
}

/// Write image bytes out as a PNG carrying the payload chunk (export path)
///
/// The image is normalized to RGBA8 before re-encoding.
pub fn embed_payload(image_bytes: &[u8], payload_json: &str) -> ImportResult<Vec<u8>> {
    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| ImportError::Extraction(format!("Image decode failed: {}", e)))?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder
            .add_text_chunk(METADATA_KEYWORD.to_string(), payload_json.to_string())
            .map_err(|e| ImportError::Extraction(format!("Text chunk write failed: {}", e)))?;

        let mut writer = encoder
            .write_header()
            .map_err(|e| ImportError::Extraction(format!("PNG header write failed: {}", e)))?;
        writer
            .write_image_data(decoded.as_raw())
            .map_err(|e| ImportError::Extraction(format!("PNG data write failed: {}", e)))?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x2 opaque PNG without any metadata
    fn plain_png() -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 2, 2);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[255u8; 16]).unwrap();
        }
        out
    }

    fn payload_json(name: &str, encoding: &str) -> String {
        serde_json::json!({
            "identifier": vibe_file::VIBE_IDENTIFIER,
            "version": 1,
            "name": name,
            "encoding": encoding,
            "strength": 0.6,
            "information_extracted": 1.0,
        })
        .to_string()
    }

    #[test]
    fn test_probe_plain_png_has_no_data() {
        assert!(probe_embedded(&plain_png()).unwrap().is_none());
    }

    #[test]
    fn test_probe_non_png_has_no_data() {
        assert!(probe_embedded(b"definitely not an image").unwrap().is_none());
        assert!(probe_embedded(&[]).unwrap().is_none());
    }

    #[test]
    fn test_embed_and_probe_round_trip() {
        let png_with_payload =
            embed_payload(&plain_png(), &payload_json("Embedded", "enc123")).unwrap();

        let refs = probe_embedded(&png_with_payload).unwrap().unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].display_name, "Embedded");
        assert_eq!(refs[0].encoding, "enc123");
        assert_eq!(refs[0].source_type, SourceType::EmbeddedImage);
    }

    #[test]
    fn test_embedded_bundle() {
        let bundle = serde_json::json!({
            "identifier": vibe_file::BUNDLE_IDENTIFIER,
            "version": 1,
            "vibes": [
                { "identifier": vibe_file::VIBE_IDENTIFIER, "version": 1, "name": "a",
                  "encoding": "x", "strength": 0.5, "information_extracted": 1.0 },
                { "identifier": vibe_file::VIBE_IDENTIFIER, "version": 1, "name": "b",
                  "encoding": "y", "strength": 0.5, "information_extracted": 1.0 },
                { "identifier": vibe_file::VIBE_IDENTIFIER, "version": 1, "name": "c",
                  "encoding": "z", "strength": 0.5, "information_extracted": 1.0 },
            ],
        })
        .to_string();

        let png_with_payload = embed_payload(&plain_png(), &bundle).unwrap();
        let refs = probe_embedded(&png_with_payload).unwrap().unwrap();
        assert_eq!(refs.len(), 3);
    }

    #[test]
    fn test_present_but_garbled_chunk_is_extraction_error() {
        let png_with_garbage = embed_payload(&plain_png(), "{ not valid json").unwrap();
        assert!(matches!(
            probe_embedded(&png_with_garbage),
            Err(ImportError::Extraction(_))
        ));
    }
}
