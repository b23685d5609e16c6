//! Import pipeline services
//!
//! Each service is a self-contained step with an explicit input/output
//! contract; the orchestrator in `crate::import` sequences them.

pub mod classifier;
pub mod encode_flow;
pub mod image_meta;
pub mod naming;
pub mod thumbnailer;
pub mod vibe_file;
