//! Native vibe payload format
//!
//! A `.vibe` file is a JSON document carrying one reference; a `.vibebundle`
//! carries an ordered list of them. The same JSON (single or bundle form) is
//! what gets embedded into PNG text chunks for shareable images, so the
//! parser here is also the decoder for embedded metadata.

use crate::error::{ImportError, ImportResult};
use crate::models::VibeLibraryEntry;
use crate::types::{SourceType, VibeReference};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Identifier value of single-vibe documents
pub const VIBE_IDENTIFIER: &str = "vibe-transfer";

/// Identifier value of bundle documents
pub const BUNDLE_IDENTIFIER: &str = "vibe-transfer-bundle";

/// Current payload format version
pub const PAYLOAD_VERSION: u32 = 1;

/// Single-vibe JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VibePayload {
    pub identifier: String,
    pub version: u32,
    pub name: String,
    pub encoding: String,
    pub strength: f32,
    pub information_extracted: f32,
    /// Base64 PNG preview
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Bundle JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundlePayload {
    pub identifier: String,
    pub version: u32,
    pub vibes: Vec<VibePayload>,
}

/// Parse native file bytes into references
///
/// Accepts both document forms regardless of which extension the file
/// carried; the identifier field is authoritative. Malformed JSON, an
/// unknown identifier, or an empty bundle is a corrupt file.
pub fn parse_native(bytes: &[u8], source_type: SourceType) -> ImportResult<Vec<VibeReference>> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| ImportError::CorruptFile(format!("Invalid JSON: {}", e)))?;

    let identifier = value
        .get("identifier")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ImportError::CorruptFile("Missing identifier field".to_string()))?;

    match identifier {
        VIBE_IDENTIFIER => {
            let payload: VibePayload = serde_json::from_value(value)
                .map_err(|e| ImportError::CorruptFile(format!("Invalid vibe payload: {}", e)))?;
            Ok(vec![reference_from_payload(&payload, source_type)?])
        }
        BUNDLE_IDENTIFIER => {
            let bundle: BundlePayload = serde_json::from_value(value)
                .map_err(|e| ImportError::CorruptFile(format!("Invalid bundle payload: {}", e)))?;

            if bundle.vibes.is_empty() {
                return Err(ImportError::CorruptFile("Bundle contains no vibes".to_string()));
            }

            bundle
                .vibes
                .iter()
                .map(|p| reference_from_payload(p, source_type))
                .collect()
        }
        other => Err(ImportError::CorruptFile(format!(
            "Unknown payload identifier: {}",
            other
        ))),
    }
}

fn reference_from_payload(
    payload: &VibePayload,
    source_type: SourceType,
) -> ImportResult<VibeReference> {
    if payload.encoding.is_empty() {
        return Err(ImportError::CorruptFile(
            "Payload carries an empty encoding".to_string(),
        ));
    }

    let thumbnail = payload
        .thumbnail
        .as_deref()
        .map(|b64| {
            BASE64
                .decode(b64)
                .map_err(|e| ImportError::CorruptFile(format!("Invalid thumbnail base64: {}", e)))
        })
        .transpose()?;

    let mut reference = VibeReference {
        display_name: payload.name.clone(),
        encoding: payload.encoding.clone(),
        strength: payload.strength,
        info_extracted: payload.information_extracted,
        source_type,
        thumbnail,
        raw_image: None,
    };
    reference.clamp_ranges();

    Ok(reference)
}

fn payload_from_reference(reference: &VibeReference) -> VibePayload {
    VibePayload {
        identifier: VIBE_IDENTIFIER.to_string(),
        version: PAYLOAD_VERSION,
        name: reference.display_name.clone(),
        encoding: reference.encoding.clone(),
        strength: reference.strength,
        information_extracted: reference.info_extracted,
        thumbnail: reference.thumbnail.as_deref().map(|t| BASE64.encode(t)),
    }
}

/// Serialize an entry back to its native JSON document (export path)
///
/// Single-reference entries produce the single-vibe form; bundles produce
/// the bundle form.
pub fn serialize_entry(entry: &VibeLibraryEntry) -> ImportResult<Vec<u8>> {
    let json = if entry.references.len() == 1 {
        let mut payload = payload_from_reference(&entry.references[0]);
        payload.name = entry.name.clone();
        serde_json::to_vec_pretty(&payload)
    } else {
        let bundle = BundlePayload {
            identifier: BUNDLE_IDENTIFIER.to_string(),
            version: PAYLOAD_VERSION,
            vibes: entry.references.iter().map(payload_from_reference).collect(),
        };
        serde_json::to_vec_pretty(&bundle)
    };

    json.map_err(|e| ImportError::Extraction(format!("Payload serialization failed: {}", e)))
}
