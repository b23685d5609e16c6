//! Shared fixtures and mock hooks for pipeline tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vibe_import::error::ImportError;
use vibe_import::import::{
    BundleOptionHook, EncodeConfigHook, EncodeFailureHook, EncodeHook, ImportHooks, NamingHook,
    ProgressSink,
};
use vibe_import::services::vibe_file;
use vibe_import::types::{
    BundleResolution, EncodeConfig, EncodeFailureChoice, NamingDecision, VibeReference,
};
use vibe_import::SqliteVibeRepository;

// ============================================================================
// Repository
// ============================================================================

/// Opt-in log output for debugging a failing test: RUST_LOG=debug cargo test
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn memory_repo() -> Arc<SqliteVibeRepository> {
    init_tracing();
    let pool = vibe_common::db::init_memory_database()
        .await
        .expect("in-memory database");
    Arc::new(SqliteVibeRepository::new(pool))
}

// ============================================================================
// Payload fixtures
// ============================================================================

pub fn vibe_json(name: &str, encoding: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "identifier": vibe_file::VIBE_IDENTIFIER,
        "version": 1,
        "name": name,
        "encoding": encoding,
        "strength": 0.6,
        "information_extracted": 1.0,
    }))
    .expect("serialize fixture")
}

pub fn bundle_json(vibes: &[(&str, &str)]) -> Vec<u8> {
    let vibes: Vec<serde_json::Value> = vibes
        .iter()
        .map(|(name, encoding)| {
            serde_json::json!({
                "identifier": vibe_file::VIBE_IDENTIFIER,
                "version": 1,
                "name": name,
                "encoding": encoding,
                "strength": 0.5,
                "information_extracted": 1.0,
            })
        })
        .collect();

    serde_json::to_vec(&serde_json::json!({
        "identifier": vibe_file::BUNDLE_IDENTIFIER,
        "version": 1,
        "vibes": vibes,
    }))
    .expect("serialize fixture")
}

/// Small opaque PNG with no metadata
pub fn plain_png() -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, 4, 4);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().expect("png header");
        writer.write_image_data(&[200u8; 64]).expect("png data");
    }
    out
}

/// PNG carrying an embedded single-vibe payload
pub fn png_with_payload(name: &str, encoding: &str) -> Vec<u8> {
    let payload = String::from_utf8(vibe_json(name, encoding)).expect("utf8 payload");
    vibe_import::services::image_meta::embed_payload(&plain_png(), &payload)
        .expect("embed payload")
}

/// PNG carrying an embedded bundle payload
pub fn png_with_bundle(vibes: &[(&str, &str)]) -> Vec<u8> {
    let payload = String::from_utf8(bundle_json(vibes)).expect("utf8 payload");
    vibe_import::services::image_meta::embed_payload(&plain_png(), &payload)
        .expect("embed payload")
}

// ============================================================================
// Hook mocks
// ============================================================================

/// Naming hook that accepts the pipeline's suggestion as-is
pub struct AcceptSuggested;
#[async_trait]
impl NamingHook for AcceptSuggested {
    async fn prompt(&self, suggested: &str, _: bool, _: Option<&[u8]>) -> Option<NamingDecision> {
        Some(NamingDecision {
            name: suggested.to_string(),
            apply_to_all: false,
        })
    }
}

/// Naming hook returning a fixed name, counting its invocations
pub struct FixedNaming {
    pub name: String,
    pub apply_to_all: bool,
    pub calls: AtomicUsize,
}

impl FixedNaming {
    pub fn new(name: &str, apply_to_all: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            apply_to_all,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NamingHook for FixedNaming {
    async fn prompt(&self, _: &str, _: bool, _: Option<&[u8]>) -> Option<NamingDecision> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(NamingDecision {
            name: self.name.clone(),
            apply_to_all: self.apply_to_all,
        })
    }
}

/// Naming hook that always cancels
pub struct CancelNaming;
#[async_trait]
impl NamingHook for CancelNaming {
    async fn prompt(&self, _: &str, _: bool, _: Option<&[u8]>) -> Option<NamingDecision> {
        None
    }
}

/// Bundle hook that always answers with the same resolution
pub struct FixedBundle(pub BundleResolution);
#[async_trait]
impl BundleOptionHook for FixedBundle {
    async fn resolve(&self, _: &str, _: &[VibeReference]) -> Option<BundleResolution> {
        Some(self.0.clone())
    }
}

/// Bundle hook that always cancels
pub struct CancelBundle;
#[async_trait]
impl BundleOptionHook for CancelBundle {
    async fn resolve(&self, _: &str, _: &[VibeReference]) -> Option<BundleResolution> {
        None
    }
}

/// Encode config hook that always supplies the same parameters
pub struct FixedEncodeConfig {
    pub name: String,
}
#[async_trait]
impl EncodeConfigHook for FixedEncodeConfig {
    async fn prompt(&self, _: &str, _: &[u8]) -> Option<EncodeConfig> {
        Some(EncodeConfig {
            name: self.name.clone(),
            strength: 0.6,
            info_extracted: 1.0,
        })
    }
}

/// Encoder that always returns the same encoding
pub struct FixedEncoder(pub String);
#[async_trait]
impl EncodeHook for FixedEncoder {
    async fn encode(&self, _: &[u8], _: &str, _: f32, _: &str) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Encoder that never completes; exercises the timeout path
pub struct HangingEncoder;
#[async_trait]
impl EncodeHook for HangingEncoder {
    async fn encode(&self, _: &[u8], _: &str, _: f32, _: &str) -> Option<String> {
        tokio::time::sleep(std::time::Duration::from_secs(86400)).await;
        None
    }
}

/// Failure hook with a fixed answer
pub struct FixedFailureChoice(pub EncodeFailureChoice);
#[async_trait]
impl EncodeFailureHook for FixedFailureChoice {
    async fn on_failure(&self, _: &str, _: &ImportError) -> EncodeFailureChoice {
        self.0
    }
}

/// Progress sink recording every call
#[derive(Default)]
pub struct RecordingProgress {
    pub calls: Mutex<Vec<(usize, usize, String)>>,
}

impl RecordingProgress {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> Vec<(usize, usize, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressSink for RecordingProgress {
    async fn report(&self, current: usize, total: usize, message: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((current, total, message.to_string()));
    }
}

// Panicking hooks prove a path never fires

pub struct PanicNaming;
#[async_trait]
impl NamingHook for PanicNaming {
    async fn prompt(&self, _: &str, _: bool, _: Option<&[u8]>) -> Option<NamingDecision> {
        panic!("naming hook must not fire");
    }
}

pub struct PanicBundle;
#[async_trait]
impl BundleOptionHook for PanicBundle {
    async fn resolve(&self, _: &str, _: &[VibeReference]) -> Option<BundleResolution> {
        panic!("bundle hook must not fire");
    }
}

pub struct PanicEncodeConfig;
#[async_trait]
impl EncodeConfigHook for PanicEncodeConfig {
    async fn prompt(&self, _: &str, _: &[u8]) -> Option<EncodeConfig> {
        panic!("encode config hook must not fire");
    }
}

pub struct PanicEncoder;
#[async_trait]
impl EncodeHook for PanicEncoder {
    async fn encode(&self, _: &[u8], _: &str, _: f32, _: &str) -> Option<String> {
        panic!("encode hook must not fire");
    }
}

pub struct PanicFailure;
#[async_trait]
impl EncodeFailureHook for PanicFailure {
    async fn on_failure(&self, _: &str, _: &ImportError) -> EncodeFailureChoice {
        panic!("encode failure hook must not fire");
    }
}

pub struct PanicProgress;
#[async_trait]
impl ProgressSink for PanicProgress {
    async fn report(&self, _: usize, _: usize, _: &str) {
        panic!("progress sink must not fire");
    }
}

// ============================================================================
// Hook assembly
// ============================================================================

/// Builder starting from hooks that panic when touched; tests swap in only
/// the hooks the path under test is allowed to reach
pub struct HookSet {
    pub naming: Arc<dyn NamingHook>,
    pub bundle: Arc<dyn BundleOptionHook>,
    pub encode_config: Arc<dyn EncodeConfigHook>,
    pub encode: Arc<dyn EncodeHook>,
    pub encode_failure: Arc<dyn EncodeFailureHook>,
    pub progress: Arc<dyn ProgressSink>,
}

impl HookSet {
    pub fn strict() -> Self {
        Self {
            naming: Arc::new(PanicNaming),
            bundle: Arc::new(PanicBundle),
            encode_config: Arc::new(PanicEncodeConfig),
            encode: Arc::new(PanicEncoder),
            encode_failure: Arc::new(PanicFailure),
            progress: Arc::new(PanicProgress),
        }
    }

    /// Common baseline: accept suggested names, ignore progress
    pub fn lenient() -> Self {
        let mut set = Self::strict();
        set.naming = Arc::new(AcceptSuggested);
        set.progress = RecordingProgress::new();
        set
    }

    pub fn build(self) -> ImportHooks {
        ImportHooks {
            naming: self.naming,
            bundle: self.bundle,
            encode_config: self.encode_config,
            encode: self.encode,
            encode_failure: self.encode_failure,
            progress: self.progress,
        }
    }
}
