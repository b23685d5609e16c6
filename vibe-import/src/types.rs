//! Shared types and data contracts for the import pipeline
//!
//! These types are the explicit contracts between the classifier, extractor,
//! bundle resolver, encode-on-demand flow, and the batch orchestrator.

use crate::error::ImportError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use uuid::Uuid;

/// Valid range for reference strength
pub const STRENGTH_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.5;

/// Valid range for information-extracted
pub const INFO_EXTRACTED_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;

// ============================================================================
// Import sources
// ============================================================================

/// Raw input accepted by the pipeline; constructed by the caller per batch
#[derive(Debug, Clone)]
pub enum ImportSource {
    /// A file on disk; the extension on the path decides the extraction path
    File { path: PathBuf },

    /// In-memory image bytes (dropped/pasted image)
    Image { origin_hint: String, bytes: Vec<u8> },

    /// Clipboard or typed text treated directly as an encoding
    Encoding { origin_label: String, text: String },
}

impl ImportSource {
    /// Human-readable label for logging and prompts
    pub fn label(&self) -> String {
        match self {
            ImportSource::File { path } => path.display().to_string(),
            ImportSource::Image { origin_hint, .. } => origin_hint.clone(),
            ImportSource::Encoding { origin_label, .. } => origin_label.clone(),
        }
    }
}

/// Extraction path selected by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Native vibe file holding a single reference
    NativeFile,
    /// Native bundle file holding one or more references
    NativeBundle,
    /// Image bytes, possibly with embedded vibe metadata
    Image,
    /// Text treated verbatim as an encoding
    Encoding,
}

// ============================================================================
// Vibe references
// ============================================================================

/// Where a reference's encoding came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    NativeFile,
    EmbeddedImage,
    ClipboardEncoding,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::NativeFile => "native_file",
            SourceType::EmbeddedImage => "embedded_image",
            SourceType::ClipboardEncoding => "clipboard_encoding",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "native_file" => Some(SourceType::NativeFile),
            "embedded_image" => Some(SourceType::EmbeddedImage),
            "clipboard_encoding" => Some(SourceType::ClipboardEncoding),
            _ => None,
        }
    }
}

/// The normalized unit of imported content
#[derive(Debug, Clone)]
pub struct VibeReference {
    pub display_name: String,
    /// Opaque model-specific latent encoding; must be non-empty to persist
    pub encoding: String,
    pub strength: f32,
    pub info_extracted: f32,
    pub source_type: SourceType,
    /// Small PNG preview, if one was generated or carried by the payload
    pub thumbnail: Option<Vec<u8>>,
    pub raw_image: Option<Vec<u8>>,
}

impl VibeReference {
    /// Clamp strength and information-extracted into their valid ranges
    pub fn clamp_ranges(&mut self) {
        self.strength = self
            .strength
            .clamp(*STRENGTH_RANGE.start(), *STRENGTH_RANGE.end());
        self.info_extracted = self
            .info_extracted
            .clamp(*INFO_EXTRACTED_RANGE.start(), *INFO_EXTRACTED_RANGE.end());
    }

    /// A reference is persistable only with a non-empty encoding
    pub fn is_persistable(&self) -> bool {
        !self.encoding.is_empty()
    }

    /// SHA-256 hex digest of the encoding; stable content identity
    pub fn encoding_digest(&self) -> String {
        format!("{:x}", Sha256::digest(self.encoding.as_bytes()))
    }
}

// ============================================================================
// Bundle resolution
// ============================================================================

/// The caller's choice when one source yields more than one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleResolution {
    /// Persist all references under one entry
    KeepAsBundle,
    /// Persist each reference as its own entry
    Split,
    /// Persist only the chosen references, each as its own entry
    SelectSubset(Vec<usize>),
}

// ============================================================================
// Encode-on-demand contracts
// ============================================================================

/// Parameters the user supplies for an on-demand encode
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    pub name: String,
    pub strength: f32,
    pub info_extracted: f32,
}

/// User's choice after a failed encode attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFailureChoice {
    /// Try the external encode call again
    Retry,
    /// Give up on this source and count it as a failure
    Skip,
    /// Abandon this source without counting it either way
    Cancel,
}

// ============================================================================
// Naming
// ============================================================================

/// Result of the naming prompt
#[derive(Debug, Clone)]
pub struct NamingDecision {
    pub name: String,
    /// Reuse this name as the base for every later file source in the batch
    pub apply_to_all: bool,
}

// ============================================================================
// Outcomes
// ============================================================================

/// Per-source result of the pipeline
#[derive(Debug)]
pub enum ImportOutcome {
    /// One or more entries were created from this source
    Imported { entry_ids: Vec<Uuid> },
    /// The source failed; reason is logged and counted
    Failed(ImportError),
    /// The user abandoned this source; counts toward neither total
    Cancelled,
}

/// Aggregate result of a batch; cancelled items count toward neither field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchImportResult {
    pub success_count: usize,
    pub fail_count: usize,
}

impl BatchImportResult {
    pub fn record(&mut self, outcome: &ImportOutcome) {
        match outcome {
            ImportOutcome::Imported { .. } => self.success_count += 1,
            ImportOutcome::Failed(_) => self.fail_count += 1,
            ImportOutcome::Cancelled => {}
        }
    }

    /// True when every source was cancelled (or the batch was empty); the
    /// caller suppresses its completion notification in this case
    pub fn is_silent(&self) -> bool {
        self.success_count == 0 && self.fail_count == 0
    }
}
