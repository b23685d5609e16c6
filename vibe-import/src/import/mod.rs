//! Batch import orchestration
//!
//! The orchestrator drives classify -> extract -> bundle-resolve ->
//! encode-on-demand -> name-resolve -> persist for each source, with
//! per-source fault isolation and progress reporting.

pub mod events;
pub mod hooks;
pub mod orchestrator;

pub use events::ImportEvent;
pub use hooks::{
    BundleOptionHook, EncodeConfigHook, EncodeFailureHook, EncodeHook, ImportHooks, NamingHook,
    ProgressSink,
};
pub use orchestrator::ImportPipeline;
