//! Persisted library entry wrapping one vibe reference or a bundle

use crate::types::VibeReference;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The persisted library record
///
/// An entry wraps one reference, or an ordered bundle of references sharing
/// one record. `name` is unique case-insensitively within the library at the
/// time of creation; the import pipeline resolves collisions before saving.
#[derive(Debug, Clone)]
pub struct VibeLibraryEntry {
    /// Unique identifier, immutable once assigned
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
    pub used_count: i64,
    /// One reference, or an ordered bundle (len > 1)
    pub references: Vec<VibeReference>,
}

impl VibeLibraryEntry {
    /// Create a new entry; ranges on every reference are clamped here so
    /// nothing out-of-range ever reaches the repository
    pub fn new(
        name: String,
        category_id: Option<Uuid>,
        mut references: Vec<VibeReference>,
    ) -> Self {
        for reference in &mut references {
            reference.clamp_ranges();
        }

        Self {
            id: Uuid::new_v4(),
            name,
            category_id,
            is_favorite: false,
            created_at: Utc::now(),
            last_used: None,
            used_count: 0,
            references,
        }
    }

    /// True when the entry holds more than one reference
    pub fn is_bundle(&self) -> bool {
        self.references.len() > 1
    }

    /// Record a use of this entry
    pub fn touch_used(&mut self) {
        self.used_count += 1;
        self.last_used = Some(Utc::now());
    }

    /// An entry is persistable only when every reference carries an encoding
    pub fn is_persistable(&self) -> bool {
        !self.references.is_empty() && self.references.iter().all(|r| r.is_persistable())
    }
}
