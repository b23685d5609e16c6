//! Vibe library import pipeline
//!
//! Turns heterogeneous import sources (native vibe files, bundles, images
//! with or without embedded metadata, clipboard encodings) into persisted
//! library entries. The pipeline is UI-agnostic: every user decision point
//! is an injected async hook, and persistence goes through an injected
//! repository trait.
//!
//! Entry point is [`import::ImportPipeline::import_batch`].

pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod repo;
pub mod services;
pub mod types;

pub use db::SqliteVibeRepository;
pub use error::{ImportError, ImportResult};
pub use import::{ImportEvent, ImportHooks, ImportPipeline};
pub use models::{Category, VibeLibraryEntry};
pub use repo::VibeRepository;
pub use types::{
    BatchImportResult, BundleResolution, EncodeConfig, EncodeFailureChoice, ImportOutcome,
    ImportSource, NamingDecision, SourceType, VibeReference,
};
