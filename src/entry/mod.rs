//! Bibliography entries and the file attachments they own.
//!
//! - [`LinkedFile`] - a path or URL attached to an entry, plus its type key
//! - [`BibEntry`] - an entry with a citation key, fields and attachments
//! - [`EntryType`] - the bibliographic kind used by `[entrytype]` patterns

mod bib_entry;
mod entry_type;
mod linked_file;

pub use bib_entry::BibEntry;
pub use entry_type::EntryType;
pub use linked_file::LinkedFile;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An entry shared between a caller and the background tasks mutating it.
///
/// Callers must serialize operations against the same attachment; the lock
/// only protects the attachment list from torn updates.
pub type SharedEntry = Arc<Mutex<BibEntry>>;

/// Wraps an entry for use with [`crate::LinkedFileManager`].
#[must_use]
pub fn share_entry(entry: BibEntry) -> SharedEntry {
    Arc::new(Mutex::new(entry))
}

/// Locks a shared entry, recovering the data if a previous holder panicked.
pub fn lock_entry(entry: &SharedEntry) -> MutexGuard<'_, BibEntry> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}
