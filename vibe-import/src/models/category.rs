//! Category tree node
//!
//! Categories are consumed, not owned, by the import pipeline; the pipeline
//! only assigns `category_id` on new entries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A node in the category tree (no cycles; enforced at the repository)
#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String, parent_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            parent_id,
            created_at: Utc::now(),
        }
    }
}
