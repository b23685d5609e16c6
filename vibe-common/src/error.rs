//! Shared error type for the vibe library crates
//!
//! Storage and configuration failures surface through this one enum so the
//! import crate can wrap them behind a single `Persistence` variant.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures from the library's storage and configuration layers
#[derive(Error, Debug)]
pub enum Error {
    /// Library database operation failed
    #[error("Library database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file unreadable, unparseable, or missing a required value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entry or category lookup came up empty
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller-supplied value rejected, e.g. a move that would cycle the
    /// category tree
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored data violated an invariant (unreadable UUID, unknown tag)
    #[error("Internal error: {0}")]
    Internal(String),
}
