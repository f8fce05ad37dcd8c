use std::path::Path;

use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value as Json};

use super::{SyncReport, WalkError, WalkResult, Walker};
use crate::normalize::{split_id, ID_KEY};
use crate::store::{CollectionRef, DocumentStore};

/// True if `value` looks like a nested collection in a structure snapshot:
/// a non-empty array whose entries are all objects with a string `id`.
pub fn is_nested_collection(value: &Json) -> bool {
    match value {
        Json::Array(items) => {
            !items.is_empty()
                && items
                    .iter()
                    .all(|item| item.get(ID_KEY).map(Json::is_string).unwrap_or(false))
        }
        _ => false,
    }
}

impl<'a, S: DocumentStore + ?Sized> Walker<'a, S> {
    /// Reads `collection` into portable document objects, nesting each
    /// non-empty sub-collection under a key named after it.
    pub fn collect_collection<'b>(
        &'b self,
        collection: &'b CollectionRef,
    ) -> BoxFuture<'b, WalkResult<(Vec<Json>, SyncReport)>> {
        async move {
            let mut report = SyncReport::default();
            let mut documents = Vec::new();

            for doc in self.store.get_documents(collection).await? {
                let mut data = self.normalizer.document_to_portable(&doc);
                let doc_ref = collection.doc(&doc.id)?;

                for sub in self.store.list_subcollections(&doc_ref).await? {
                    let (nested, nested_report) = self.collect_collection(&sub).await?;
                    if nested.is_empty() {
                        continue;
                    }
                    if data.contains_key(sub.id()) {
                        tracing::warn!(
                            "Sub-collection {} replaces a field of the same name",
                            sub
                        );
                    }
                    data.insert(sub.id().to_string(), Json::Array(nested));
                    report += nested_report;
                }

                documents.push(Json::Object(data));
            }

            if !documents.is_empty() {
                report.collections += 1;
                report.documents_written += documents.len();
            }
            Ok((documents, report))
        }
        .boxed()
    }

    /// Upserts structure-snapshot documents into `collection`.
    ///
    /// Keys holding nested collections (see [`is_nested_collection`]) are
    /// stripped from the fields and imported under the document. Nothing is
    /// deleted.
    ///
    /// The snapshot does not mark sub-collections explicitly, so an ordinary
    /// field holding an array of objects with string ids is imported as a
    /// sub-collection as well.
    pub fn import_documents<'b>(
        &'b self,
        collection: CollectionRef,
        documents: Vec<Json>,
        source: &'b Path,
    ) -> BoxFuture<'b, WalkResult<SyncReport>> {
        async move {
            let mut report = SyncReport::default();

            for item in documents {
                let Json::Object(obj) = item else {
                    return Err(WalkError::Malformed(
                        source.to_path_buf(),
                        format!("non-object entry in {}", collection),
                    ));
                };
                let Some((id, obj)) = split_id(obj) else {
                    return Err(WalkError::Malformed(
                        source.to_path_buf(),
                        format!("document without a string id in {}", collection),
                    ));
                };

                let mut fields = Map::new();
                let mut nested = Vec::new();
                for (key, value) in obj {
                    if is_nested_collection(&value) {
                        nested.push((key, value));
                    } else {
                        fields.insert(key, value);
                    }
                }

                let doc_ref = collection.doc(&id)?;
                self.store
                    .set_document(&doc_ref, self.normalizer.fields_to_native(&fields))
                    .await?;
                tracing::info!("Upserted {}", doc_ref);
                report.documents_written += 1;

                for (name, value) in nested {
                    let Json::Array(items) = value else {
                        continue;
                    };
                    let sub = doc_ref.collection(&name)?;
                    report += self.import_documents(sub, items, source).await?;
                }
            }

            report.collections += 1;
            Ok(report)
        }
        .boxed()
    }
}
