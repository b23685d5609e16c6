//! Naming and conflict resolution
//!
//! Guarantees the persisted entry name is unique (case-insensitive) within
//! the current entry set before the repository is called. The snapshot of
//! existing names is re-read on every resolution, never cached across a
//! batch, so two same-named items in one batch still get distinct suffixes.

use crate::error::ImportResult;
use crate::repo::VibeRepository;
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;

/// Resolve a candidate base name against the live entry set
pub struct NameResolver<'a> {
    repository: &'a dyn VibeRepository,
}

impl<'a> NameResolver<'a> {
    pub fn new(repository: &'a dyn VibeRepository) -> Self {
        Self { repository }
    }

    /// Return `base` verbatim if free, otherwise `base (N)` with N counting
    /// up from 2 until no collision remains
    pub async fn resolve_unique(&self, base: &str) -> ImportResult<String> {
        let existing: HashSet<String> = self
            .repository
            .entry_names()
            .await?
            .into_iter()
            .map(|n| n.to_lowercase())
            .collect();

        if !existing.contains(&base.to_lowercase()) {
            return Ok(base.to_string());
        }

        let mut n = 2u32;
        loop {
            let candidate = format!("{} ({})", base, n);
            if !existing.contains(&candidate.to_lowercase()) {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

/// Candidate base name derivation: explicit name, else source filename stem,
/// else a generated fallback
pub fn base_name(explicit: Option<&str>, source_path: Option<&Path>) -> String {
    if let Some(name) = explicit {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if let Some(path) = source_path {
        if let Some(stem) = path.file_stem() {
            let stem = stem.to_string_lossy();
            if !stem.is_empty() {
                return stem.to_string();
            }
        }
    }

    fallback_name()
}

/// Generated fallback for sources with no usable name
pub fn fallback_name() -> String {
    format!("vibe_{}", Utc::now().timestamp())
}
