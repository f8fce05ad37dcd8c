//! Recursive walk over the store's collection tree.
//!
//! A [`Walker`] pairs a store handle with a [`Normalizer`] and implements
//! each direction of the copy:
//!
//! - `export`: store -> folder tree of JSON files
//! - `import`: folder tree -> store, with exact-mirror deletes
//! - `structure`: store <-> single nested JSON document
//! - `delete`: cascading deletes used by the importer and the wipe phase
//!
//! Traversal is depth-first and strictly sequential; every store call is
//! awaited before the next one starts.

mod delete;
mod error;
mod export;
mod files;
mod import;
mod structure;

pub use error::{WalkError, WalkResult};
pub(crate) use files::dir_has_entries;
pub use files::{json_files_in, read_json, write_json};
pub use structure::is_nested_collection;

use crate::normalize::Normalizer;
use crate::store::DocumentStore;

/// Counts of what a walk touched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Collections exported or synced (sub-collections included)
    pub collections: usize,
    /// Documents written to files or upserted into the store
    pub documents_written: usize,
    /// Documents deleted from the store
    pub documents_deleted: usize,
    /// JSON files written
    pub files_written: usize,
}

impl std::ops::AddAssign for SyncReport {
    fn add_assign(&mut self, other: Self) {
        self.collections += other.collections;
        self.documents_written += other.documents_written;
        self.documents_deleted += other.documents_deleted;
        self.files_written += other.files_written;
    }
}

/// Walks a document store, converting values with a [`Normalizer`].
pub struct Walker<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    normalizer: Normalizer,
}

impl<'a, S: DocumentStore + ?Sized> Walker<'a, S> {
    pub fn new(store: &'a S, normalizer: Normalizer) -> Self {
        Self { store, normalizer }
    }
}
