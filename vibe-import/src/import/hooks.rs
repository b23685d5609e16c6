//! Caller-injected hooks
//!
//! Every user-facing decision point in the pipeline is an injected async
//! hook with a documented cancellation sentinel (`None`), which keeps the
//! pipeline UI-agnostic and unit-testable without any UI harness. Hooks must
//! not panic; a panicking hook is a programming-contract violation and is
//! allowed to propagate.

use crate::error::ImportError;
use crate::types::{
    BundleResolution, EncodeConfig, EncodeFailureChoice, NamingDecision, VibeReference,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Naming prompt, fired once per file source (file import path only)
///
/// `is_batch` tells the UI whether an apply-to-all affordance makes sense.
/// `None` cancels the current source, never the batch.
#[async_trait]
pub trait NamingHook: Send + Sync {
    async fn prompt(
        &self,
        suggested: &str,
        is_batch: bool,
        thumbnail: Option<&[u8]>,
    ) -> Option<NamingDecision>;
}

/// Bundle-resolution prompt, fired when one source yields several references
#[async_trait]
pub trait BundleOptionHook: Send + Sync {
    async fn resolve(
        &self,
        source_label: &str,
        references: &[VibeReference],
    ) -> Option<BundleResolution>;
}

/// Encode parameter prompt for images without embedded metadata
#[async_trait]
pub trait EncodeConfigHook: Send + Sync {
    async fn prompt(&self, origin_hint: &str, image_bytes: &[u8]) -> Option<EncodeConfig>;
}

/// External encode operation; `None` or an empty string means failure.
/// The pipeline bounds every call with a timeout, the hook does not need to.
#[async_trait]
pub trait EncodeHook: Send + Sync {
    async fn encode(
        &self,
        image_bytes: &[u8],
        model: &str,
        info_extracted: f32,
        name: &str,
    ) -> Option<String>;
}

/// Retry/Skip/Cancel prompt after a failed encode attempt
#[async_trait]
pub trait EncodeFailureHook: Send + Sync {
    async fn on_failure(&self, origin_hint: &str, error: &ImportError) -> EncodeFailureChoice;
}

/// Per-source progress reporting; fired after each source completes with a
/// strictly increasing `current` and a `total` fixed at batch start
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, current: usize, total: usize, message: &str);
}

/// All hooks the orchestrator needs, bundled for injection
#[derive(Clone)]
pub struct ImportHooks {
    pub naming: Arc<dyn NamingHook>,
    pub bundle: Arc<dyn BundleOptionHook>,
    pub encode_config: Arc<dyn EncodeConfigHook>,
    pub encode: Arc<dyn EncodeHook>,
    pub encode_failure: Arc<dyn EncodeFailureHook>,
    pub progress: Arc<dyn ProgressSink>,
}
