//! Repository abstraction over the backing entry store
//!
//! The import pipeline only ever reads the current name set and appends new
//! entries; the maintenance operations serve the library UI's edit paths.
//! Keeping this behind a trait lets the pipeline run against an in-memory
//! database in tests without any UI harness.

use crate::models::VibeLibraryEntry;
use async_trait::async_trait;
use uuid::Uuid;
use vibe_common::Result;

/// Backing store for vibe library entries
#[async_trait]
pub trait VibeRepository: Send + Sync {
    /// Load all entries with their references
    async fn get_all_entries(&self) -> Result<Vec<VibeLibraryEntry>>;

    /// Fresh snapshot of all entry names, as stored
    ///
    /// The naming resolver re-reads this on every resolution so that two
    /// same-named items in one batch still get distinct suffixes.
    async fn entry_names(&self) -> Result<Vec<String>>;

    /// Persist a new entry and its references
    async fn save_entry(&self, entry: &VibeLibraryEntry) -> Result<()>;

    /// Delete an entry; its references are removed with it
    async fn delete_entry(&self, id: Uuid) -> Result<()>;

    /// Rename an entry; the caller is responsible for uniqueness
    async fn rename_entry(&self, id: Uuid, name: &str) -> Result<()>;

    /// Move an entry to a category (or to none)
    async fn set_category(&self, id: Uuid, category_id: Option<Uuid>) -> Result<()>;

    /// Toggle the favorite flag
    async fn set_favorite(&self, id: Uuid, favorite: bool) -> Result<()>;

    /// Bump usage count and last-used timestamp
    async fn record_use(&self, id: Uuid) -> Result<()>;
}
