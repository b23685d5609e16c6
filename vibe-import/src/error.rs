//! Error types for the vibe import pipeline
//!
//! Every per-source failure is caught at the orchestrator boundary and turned
//! into a `Failed` outcome; none of these propagate out of a batch.

use thiserror::Error;

/// Per-source import failure reasons
#[derive(Debug, Error)]
pub enum ImportError {
    /// Classification rejected the source (unrecognized extension)
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Structured payload deserialization failed
    #[error("Corrupt payload: {0}")]
    CorruptFile(String),

    /// Unexpected failure reading embedded metadata
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// External encode call exceeded its time bound
    #[error("Encode call timed out after {0}s")]
    EncodeTimeout(u64),

    /// External encode call failed or returned no encoding
    #[error("Encode call failed: {0}")]
    Encode(String),

    /// Repository save or read failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] vibe_common::Error),

    /// I/O error reading source bytes
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline-internal operations
pub type ImportResult<T> = Result<T, ImportError>;
