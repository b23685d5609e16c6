//! Batch import pipeline
//!
//! Drives a heterogeneous batch of sources through classification,
//! extraction, bundle resolution, naming and persistence. One failed source
//! never aborts the batch: each source resolves to exactly one of
//! Imported, Failed or Cancelled, and the batch result counts the first two.

use crate::error::{ImportError, ImportResult};
use crate::import::events::ImportEvent;
use crate::import::hooks::ImportHooks;
use crate::models::VibeLibraryEntry;
use crate::repo::VibeRepository;
use crate::services::classifier;
use crate::services::encode_flow::{EncodeFlowOutcome, EncodeOnDemand};
use crate::services::image_meta;
use crate::services::naming::{self, NameResolver};
use crate::services::vibe_file;
use crate::types::{
    BatchImportResult, BundleResolution, ImportOutcome, ImportSource, SourceKind, SourceType,
    VibeReference,
};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vibe_common::config::ImportConfig;

/// Batch import pipeline over an injected repository and hook set
pub struct ImportPipeline {
    repository: Arc<dyn VibeRepository>,
    hooks: ImportHooks,
    config: ImportConfig,
    event_tx: Option<broadcast::Sender<ImportEvent>>,
}

impl ImportPipeline {
    pub fn new(repository: Arc<dyn VibeRepository>, hooks: ImportHooks) -> Self {
        Self {
            repository,
            hooks,
            config: ImportConfig::default(),
            event_tx: None,
        }
    }

    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a broadcast channel for live import events
    pub fn with_events(mut self, event_tx: broadcast::Sender<ImportEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Import a batch of sources into the library
    ///
    /// Sources are processed in order. `category_id`, when set, is assigned
    /// to every entry the batch creates. An empty batch returns immediately
    /// without invoking any hook.
    pub async fn import_batch(
        &self,
        sources: Vec<ImportSource>,
        category_id: Option<Uuid>,
    ) -> BatchImportResult {
        let total = sources.len();
        if total == 0 {
            return BatchImportResult::default();
        }

        let batch_id = Uuid::new_v4();
        info!(batch_id = %batch_id, total = total, "Starting import batch");
        self.emit(ImportEvent::BatchStarted { batch_id, total });

        let mut file_bytes = self.prefetch_files(&sources).await;

        // A shared name only makes sense when several file sources take the
        // naming prompt
        let file_count = sources
            .iter()
            .filter(|s| matches!(s, ImportSource::File { .. }))
            .count();
        let is_batch = file_count > 1;

        let mut result = BatchImportResult::default();
        let mut batch_base: Option<String> = None;

        for (index, source) in sources.into_iter().enumerate() {
            let label = source.label();
            self.emit(ImportEvent::SourceStarted {
                batch_id,
                index,
                label: label.clone(),
            });

            let outcome = self
                .process_source(source, file_bytes.remove(&index), category_id, is_batch, &mut batch_base)
                .await;

            let message = match &outcome {
                ImportOutcome::Imported { entry_ids } => {
                    debug!(batch_id = %batch_id, source = %label, entries = entry_ids.len(), "Source imported");
                    self.emit(ImportEvent::SourceImported {
                        batch_id,
                        index,
                        entry_ids: entry_ids.clone(),
                    });
                    format!("Imported {}", label)
                }
                ImportOutcome::Failed(error) => {
                    warn!(batch_id = %batch_id, source = %label, error = %error, "Source failed");
                    self.emit(ImportEvent::SourceFailed {
                        batch_id,
                        index,
                        error: error.to_string(),
                    });
                    format!("Failed {}: {}", label, error)
                }
                ImportOutcome::Cancelled => {
                    debug!(batch_id = %batch_id, source = %label, "Source cancelled");
                    self.emit(ImportEvent::SourceCancelled { batch_id, index });
                    format!("Cancelled {}", label)
                }
            };

            result.record(&outcome);
            self.hooks.progress.report(index + 1, total, &message).await;
        }

        info!(
            batch_id = %batch_id,
            success = result.success_count,
            failed = result.fail_count,
            "Import batch complete"
        );
        self.emit(ImportEvent::BatchCompleted {
            batch_id,
            success_count: result.success_count,
            fail_count: result.fail_count,
        });
        result
    }

    /// Read all file sources up front with bounded concurrency; read errors
    /// surface later as per-source failures
    async fn prefetch_files(
        &self,
        sources: &[ImportSource],
    ) -> HashMap<usize, std::io::Result<Vec<u8>>> {
        let reads: Vec<(usize, PathBuf)> = sources
            .iter()
            .enumerate()
            .filter_map(|(index, source)| match source {
                ImportSource::File { path } => Some((index, path.clone())),
                _ => None,
            })
            .collect();

        stream::iter(reads)
            .map(|(index, path)| async move { (index, tokio::fs::read(&path).await) })
            .buffer_unordered(self.config.read_concurrency.max(1))
            .collect()
            .await
    }

    async fn process_source(
        &self,
        source: ImportSource,
        prefetched: Option<std::io::Result<Vec<u8>>>,
        category_id: Option<Uuid>,
        is_batch: bool,
        batch_base: &mut Option<String>,
    ) -> ImportOutcome {
        let kind = match classifier::classify(&source) {
            Ok(kind) => kind,
            Err(error) => return ImportOutcome::Failed(error),
        };

        match (kind, source) {
            (SourceKind::NativeFile | SourceKind::NativeBundle, ImportSource::File { path }) => {
                let bytes = match Self::take_bytes(prefetched) {
                    Ok(bytes) => bytes,
                    Err(error) => return ImportOutcome::Failed(error),
                };
                self.import_native(&path, &bytes, category_id, is_batch, batch_base)
                    .await
            }

            (SourceKind::Image, ImportSource::File { path }) => {
                let bytes = match Self::take_bytes(prefetched) {
                    Ok(bytes) => bytes,
                    Err(error) => return ImportOutcome::Failed(error),
                };
                self.import_image(&path.display().to_string(), &bytes, category_id)
                    .await
            }

            (SourceKind::Image, ImportSource::Image { origin_hint, bytes }) => {
                self.import_image(&origin_hint, &bytes, category_id).await
            }

            (SourceKind::Encoding, ImportSource::Encoding { origin_label, text }) => {
                self.import_encoding(&origin_label, &text, category_id).await
            }

            // classify() keys off the variant, so kind and variant agree
            _ => ImportOutcome::Failed(ImportError::Extraction(
                "Source kind does not match source variant".to_string(),
            )),
        }
    }

    fn take_bytes(prefetched: Option<std::io::Result<Vec<u8>>>) -> ImportResult<Vec<u8>> {
        match prefetched {
            Some(Ok(bytes)) => Ok(bytes),
            Some(Err(error)) => Err(ImportError::Io(error)),
            None => Err(ImportError::Extraction(
                "File source was not prefetched".to_string(),
            )),
        }
    }

    /// Native `.vibe` / `.vibebundle` path: parse, prompt for a name, persist
    ///
    /// The payload identifier, not the extension, decides single versus
    /// bundle form; a bundle payload routes through bundle resolution.
    async fn import_native(
        &self,
        path: &std::path::Path,
        bytes: &[u8],
        category_id: Option<Uuid>,
        is_batch: bool,
        batch_base: &mut Option<String>,
    ) -> ImportOutcome {
        let mut references = match vibe_file::parse_native(bytes, SourceType::NativeFile) {
            Ok(references) => references,
            Err(error) => return ImportOutcome::Failed(error),
        };

        // A single payload suggests its own name. A bundle entry represents
        // the file, so it suggests the stem; its references keep their names.
        let suggested = match batch_base.as_deref() {
            Some(base) => base.to_string(),
            None => {
                let payload_name = match references.as_slice() {
                    [only] => Some(only.display_name.as_str()),
                    _ => None,
                };
                naming::base_name(payload_name, Some(path))
            }
        };

        let base = if batch_base.is_some() {
            suggested
        } else {
            let thumbnail = references.first().and_then(|r| r.thumbnail.as_deref());
            match self
                .hooks
                .naming
                .prompt(&suggested, is_batch, thumbnail)
                .await
            {
                Some(decision) => {
                    let name = naming::base_name(Some(&decision.name), Some(path));
                    if decision.apply_to_all {
                        *batch_base = Some(name.clone());
                    }
                    name
                }
                None => return ImportOutcome::Cancelled,
            }
        };

        for reference in &mut references {
            if reference.display_name.trim().is_empty() {
                reference.display_name = base.clone();
            }
        }

        self.finalize(&path.display().to_string(), references, &base, category_id)
            .await
    }

    /// Image path: embedded metadata when present, encode-on-demand otherwise
    async fn import_image(
        &self,
        origin_hint: &str,
        bytes: &[u8],
        category_id: Option<Uuid>,
    ) -> ImportOutcome {
        match image_meta::probe_embedded(bytes) {
            Ok(Some(mut references)) => {
                debug!(source = %origin_hint, count = references.len(), "Embedded metadata found");
                for reference in &mut references {
                    if reference.thumbnail.is_none() {
                        reference.thumbnail = crate::services::thumbnailer::make_thumbnail(
                            bytes,
                            self.config.thumbnail_max_edge,
                        )
                        .ok();
                    }
                    if reference.raw_image.is_none() {
                        reference.raw_image = Some(bytes.to_vec());
                    }
                }
                let base = references
                    .first()
                    .map(|r| r.display_name.clone())
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(naming::fallback_name);
                self.finalize(origin_hint, references, &base, category_id).await
            }
            Ok(None) => {
                debug!(source = %origin_hint, "No embedded metadata, encoding on demand");
                let flow = EncodeOnDemand::new(
                    &self.hooks,
                    Duration::from_secs(self.config.encode_timeout_secs),
                    self.config.encode_model.clone(),
                    self.config.thumbnail_max_edge,
                );
                match flow.run(origin_hint, bytes).await {
                    EncodeFlowOutcome::Encoded(reference) => {
                        let base = reference.display_name.clone();
                        self.finalize(origin_hint, vec![reference], &base, category_id)
                            .await
                    }
                    EncodeFlowOutcome::Failed(error) => ImportOutcome::Failed(error),
                    EncodeFlowOutcome::Cancelled => ImportOutcome::Cancelled,
                }
            }
            Err(error) => ImportOutcome::Failed(error),
        }
    }

    /// Clipboard path: the text is the encoding, verbatim
    async fn import_encoding(
        &self,
        origin_label: &str,
        text: &str,
        category_id: Option<Uuid>,
    ) -> ImportOutcome {
        let encoding = text.trim();
        if encoding.is_empty() {
            return ImportOutcome::Failed(ImportError::CorruptFile(
                "Clipboard text is empty".to_string(),
            ));
        }

        let base = {
            let label = origin_label.trim();
            if label.is_empty() {
                naming::fallback_name()
            } else {
                label.to_string()
            }
        };

        let mut reference = VibeReference {
            display_name: base.clone(),
            encoding: encoding.to_string(),
            strength: 0.6,
            info_extracted: 1.0,
            source_type: SourceType::ClipboardEncoding,
            thumbnail: None,
            raw_image: None,
        };
        reference.clamp_ranges();

        self.finalize(origin_label, vec![reference], &base, category_id)
            .await
    }

    /// Persist extracted references, resolving the bundle question when a
    /// source yielded more than one
    async fn finalize(
        &self,
        source_label: &str,
        references: Vec<VibeReference>,
        base: &str,
        category_id: Option<Uuid>,
    ) -> ImportOutcome {
        if references.is_empty() {
            return ImportOutcome::Failed(ImportError::Extraction(
                "Source yielded no references".to_string(),
            ));
        }

        if references.len() == 1 {
            return match self.save_one(base, references, category_id).await {
                Ok(entry_id) => ImportOutcome::Imported {
                    entry_ids: vec![entry_id],
                },
                Err(error) => ImportOutcome::Failed(error),
            };
        }

        let resolution = match self.hooks.bundle.resolve(source_label, &references).await {
            Some(resolution) => resolution,
            None => return ImportOutcome::Cancelled,
        };

        match resolution {
            BundleResolution::KeepAsBundle => {
                match self.save_one(base, references, category_id).await {
                    Ok(entry_id) => ImportOutcome::Imported {
                        entry_ids: vec![entry_id],
                    },
                    Err(error) => ImportOutcome::Failed(error),
                }
            }

            BundleResolution::Split => self.save_each(references, base, category_id).await,

            BundleResolution::SelectSubset(indices) => {
                let selected: Vec<VibeReference> = indices
                    .iter()
                    .filter_map(|&i| references.get(i).cloned())
                    .collect();
                if selected.is_empty() {
                    return ImportOutcome::Cancelled;
                }
                self.save_each(selected, base, category_id).await
            }
        }
    }

    /// Save several references as standalone entries, each named after its
    /// own display name. A failure mid-way keeps the entries already saved
    /// and marks the whole source failed.
    async fn save_each(
        &self,
        references: Vec<VibeReference>,
        fallback_base: &str,
        category_id: Option<Uuid>,
    ) -> ImportOutcome {
        let mut entry_ids = Vec::with_capacity(references.len());
        for reference in references {
            let base = if reference.display_name.trim().is_empty() {
                fallback_base.to_string()
            } else {
                reference.display_name.clone()
            };
            match self.save_one(&base, vec![reference], category_id).await {
                Ok(entry_id) => entry_ids.push(entry_id),
                Err(error) => return ImportOutcome::Failed(error),
            }
        }
        ImportOutcome::Imported { entry_ids }
    }

    /// Resolve a unique name and persist one entry
    async fn save_one(
        &self,
        base: &str,
        references: Vec<VibeReference>,
        category_id: Option<Uuid>,
    ) -> ImportResult<Uuid> {
        if references.iter().any(|r| !r.is_persistable()) {
            return Err(ImportError::Extraction(
                "Reference has an empty encoding".to_string(),
            ));
        }

        let resolver = NameResolver::new(self.repository.as_ref());
        let name = resolver.resolve_unique(base).await?;

        let entry = VibeLibraryEntry::new(name, category_id, references);
        self.repository.save_entry(&entry).await?;
        Ok(entry.id)
    }

    fn emit(&self, event: ImportEvent) {
        if let Some(tx) = &self.event_tx {
            // No subscribers is fine
            let _ = tx.send(event);
        }
    }
}
