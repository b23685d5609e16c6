//! SQLite-backed persistence for the vibe library

pub mod categories;
pub mod entries;

pub use entries::SqliteVibeRepository;
