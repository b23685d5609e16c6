//! Domain models persisted by the vibe library

mod category;
mod entry;

pub use category::Category;
pub use entry::VibeLibraryEntry;
