//! # Vibe Library Common
//!
//! Shared foundation for the vibe library tooling:
//! - Error type used across crates
//! - Configuration loading and library folder resolution
//! - SQLite database bootstrap (pool creation, pragmas, schema)

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
