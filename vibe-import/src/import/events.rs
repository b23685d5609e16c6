//! Import events broadcast during a batch
//!
//! Complements the injected progress sink: UI consumers that want a live
//! stream (activity log, toast notifications) subscribe to the broadcast
//! channel instead of threading state through the hook.

use serde::Serialize;
use uuid::Uuid;

/// Events emitted while a batch runs
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImportEvent {
    /// Batch accepted; `total` is fixed for the whole batch
    BatchStarted { batch_id: Uuid, total: usize },

    /// A source is being processed
    SourceStarted {
        batch_id: Uuid,
        index: usize,
        label: String,
    },

    /// A source produced one or more entries
    SourceImported {
        batch_id: Uuid,
        index: usize,
        entry_ids: Vec<Uuid>,
    },

    /// A source failed; the batch continues
    SourceFailed {
        batch_id: Uuid,
        index: usize,
        error: String,
    },

    /// The user abandoned a source
    SourceCancelled { batch_id: Uuid, index: usize },

    /// Batch finished; counts exclude cancelled sources
    BatchCompleted {
        batch_id: Uuid,
        success_count: usize,
        fail_count: usize,
    },
}
