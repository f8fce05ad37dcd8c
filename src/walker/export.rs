use std::path::Path;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value as Json;

use super::files::write_json;
use super::{SyncReport, WalkResult, Walker};
use crate::store::{CollectionRef, DocumentStore};

impl<'a, S: DocumentStore + ?Sized> Walker<'a, S> {
    /// Writes `collection` to `<folder>/<name>.json`, then every non-empty
    /// sub-collection of each document to
    /// `<folder>/<name>/<docId>/<sub>.json`, recursively.
    ///
    /// An empty collection produces no file and no folder.
    pub fn export_collection<'b>(
        &'b self,
        collection: &'b CollectionRef,
        folder: &'b Path,
    ) -> BoxFuture<'b, WalkResult<SyncReport>> {
        async move {
            let mut report = SyncReport::default();

            let docs = self.store.get_documents(collection).await?;
            if docs.is_empty() {
                tracing::debug!("Skipping empty collection {}", collection);
                return Ok(report);
            }

            let data: Vec<Json> = docs
                .iter()
                .map(|doc| Json::Object(self.normalizer.document_to_portable(doc)))
                .collect();
            let file = folder.join(format!("{}.json", collection.id()));
            write_json(&file, &Json::Array(data))?;
            tracing::info!("Exported {}: {} documents", collection, docs.len());

            report.collections += 1;
            report.documents_written += docs.len();
            report.files_written += 1;

            for doc in &docs {
                let doc_ref = collection.doc(&doc.id)?;
                let subs = self.store.list_subcollections(&doc_ref).await?;
                if subs.is_empty() {
                    continue;
                }
                let doc_folder = folder.join(collection.id()).join(&doc.id);
                for sub in &subs {
                    report += self.export_collection(sub, &doc_folder).await?;
                }
            }

            Ok(report)
        }
        .boxed()
    }
}
