//! Encoding-on-demand flow
//!
//! Images with no embedded metadata get their encoding computed by an
//! external model call. The flow is an explicit state machine so every exit
//! path is a first-class, testable outcome:
//!
//! ```text
//! AwaitingConfig --cancel--> Cancelled
//! AwaitingConfig --config--> Encoding
//! Encoding --ok--> Encoded
//! Encoding --err/timeout--> EncodeFailed
//! EncodeFailed --Retry--> Encoding
//! EncodeFailed --Skip--> Failed
//! EncodeFailed --Cancel--> Cancelled
//! ```
//!
//! The external call is always time-bounded, so the loop terminates in
//! exactly one of {Encoded, Failed, Cancelled} and never hangs.

use crate::error::{ImportError, ImportResult};
use crate::import::hooks::ImportHooks;
use crate::services::thumbnailer;
use crate::types::{EncodeConfig, EncodeFailureChoice, SourceType, VibeReference};
use std::time::Duration;
use tracing::{debug, warn};

/// Terminal result of the flow
#[derive(Debug)]
pub enum EncodeFlowOutcome {
    /// Encoding computed; the reference is ready to persist
    Encoded(VibeReference),
    /// User chose Skip after a failure; counted as a failure
    Failed(ImportError),
    /// User cancelled; counted as neither success nor failure
    Cancelled,
}

enum FlowState {
    AwaitingConfig,
    Encoding(EncodeConfig),
    EncodeFailed(EncodeConfig, ImportError),
}

/// Drives one image source through config prompt, encode call and retries
pub struct EncodeOnDemand<'a> {
    hooks: &'a ImportHooks,
    timeout: Duration,
    model: String,
    thumbnail_max_edge: u32,
}

impl<'a> EncodeOnDemand<'a> {
    pub fn new(
        hooks: &'a ImportHooks,
        timeout: Duration,
        model: String,
        thumbnail_max_edge: u32,
    ) -> Self {
        Self {
            hooks,
            timeout,
            model,
            thumbnail_max_edge,
        }
    }

    pub async fn run(&self, origin_hint: &str, image_bytes: &[u8]) -> EncodeFlowOutcome {
        let mut state = FlowState::AwaitingConfig;

        loop {
            state = match state {
                FlowState::AwaitingConfig => {
                    match self.hooks.encode_config.prompt(origin_hint, image_bytes).await {
                        Some(config) => FlowState::Encoding(config),
                        None => {
                            debug!(source = %origin_hint, "Encode config prompt cancelled");
                            return EncodeFlowOutcome::Cancelled;
                        }
                    }
                }

                FlowState::Encoding(config) => {
                    match self.attempt(image_bytes, &config).await {
                        Ok(encoding) => {
                            debug!(source = %origin_hint, "Encode call succeeded");
                            return EncodeFlowOutcome::Encoded(
                                self.build_reference(config, encoding, image_bytes),
                            );
                        }
                        Err(error) => {
                            warn!(source = %origin_hint, error = %error, "Encode call failed");
                            FlowState::EncodeFailed(config, error)
                        }
                    }
                }

                FlowState::EncodeFailed(config, error) => {
                    match self.hooks.encode_failure.on_failure(origin_hint, &error).await {
                        EncodeFailureChoice::Retry => FlowState::Encoding(config),
                        EncodeFailureChoice::Skip => return EncodeFlowOutcome::Failed(error),
                        EncodeFailureChoice::Cancel => return EncodeFlowOutcome::Cancelled,
                    }
                }
            };
        }
    }

    /// One time-bounded external encode attempt
    async fn attempt(&self, image_bytes: &[u8], config: &EncodeConfig) -> ImportResult<String> {
        let call = self.hooks.encode.encode(
            image_bytes,
            &self.model,
            config.info_extracted,
            &config.name,
        );

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Some(encoding)) if !encoding.is_empty() => Ok(encoding),
            Ok(_) => Err(ImportError::Encode(
                "Encoder returned no encoding".to_string(),
            )),
            Err(_) => Err(ImportError::EncodeTimeout(self.timeout.as_secs())),
        }
    }

    fn build_reference(
        &self,
        config: EncodeConfig,
        encoding: String,
        image_bytes: &[u8],
    ) -> VibeReference {
        // Thumbnail generation is best-effort; a reference without a preview
        // is still valid
        let thumbnail = thumbnailer::make_thumbnail(image_bytes, self.thumbnail_max_edge).ok();

        let mut reference = VibeReference {
            display_name: config.name,
            encoding,
            strength: config.strength,
            info_extracted: config.info_extracted,
            source_type: SourceType::EmbeddedImage,
            thumbnail,
            raw_image: Some(image_bytes.to_vec()),
        };
        reference.clamp_ranges();
        reference
    }
}
