//! Database bootstrap and schema for the vibe library

mod init;

pub use init::{init_database, init_memory_database};
