use futures::future::{BoxFuture, FutureExt};

use super::{WalkResult, Walker};
use crate::store::{CollectionRef, DocumentRef, DocumentStore};

impl<'a, S: DocumentStore + ?Sized> Walker<'a, S> {
    /// Deletes every document in `collection` together with its
    /// sub-collections. Returns the number of documents deleted.
    pub fn delete_collection<'b>(
        &'b self,
        collection: &'b CollectionRef,
    ) -> BoxFuture<'b, WalkResult<usize>> {
        async move {
            let mut deleted = 0;
            for doc in self.store.get_documents(collection).await? {
                let doc_ref = collection.doc(&doc.id)?;
                deleted += self.delete_document(&doc_ref).await?;
            }
            tracing::info!("Deleted collection {}", collection);
            Ok(deleted)
        }
        .boxed()
    }

    /// Deletes a document after recursively deleting its sub-collections.
    pub fn delete_document<'b>(
        &'b self,
        document: &'b DocumentRef,
    ) -> BoxFuture<'b, WalkResult<usize>> {
        async move {
            let mut deleted = 0;
            for sub in self.store.list_subcollections(document).await? {
                deleted += self.delete_collection(&sub).await?;
            }
            self.store.delete_document(document).await?;
            tracing::info!("Deleted doc {}", document);
            Ok(deleted + 1)
        }
        .boxed()
    }
}
