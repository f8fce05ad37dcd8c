//! Document store capability.
//!
//! The walker and sync driver only talk to the store through the
//! [`DocumentStore`] trait. Two backends are provided:
//!
//! - [`MemoryStore`]: in-process map, used by tests and dry runs
//! - [`FirestoreStore`]: Firestore REST API over `reqwest`
//!
//! Deleting a document never cascades at this level; callers that need
//! cascade semantics walk the sub-collections themselves.

mod error;
pub mod firestore;
mod memory;
mod path;

pub use error::{StoreError, StoreResult};
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use path::{CollectionRef, DocumentRef};

use async_trait::async_trait;

use crate::models::{Document, Fields};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Root-level collections.
    async fn list_collections(&self) -> StoreResult<Vec<CollectionRef>>;

    /// All documents directly in `collection`, in store order.
    async fn get_documents(&self, collection: &CollectionRef) -> StoreResult<Vec<Document>>;

    /// Direct sub-collections of `document`.
    ///
    /// Works for documents that do not exist themselves but have
    /// descendants.
    async fn list_subcollections(&self, document: &DocumentRef)
        -> StoreResult<Vec<CollectionRef>>;

    /// Creates the document or replaces all of its fields.
    async fn set_document(&self, document: &DocumentRef, fields: Fields) -> StoreResult<()>;

    /// Deletes the document. Deleting a missing document is not an error.
    async fn delete_document(&self, document: &DocumentRef) -> StoreResult<()>;
}
