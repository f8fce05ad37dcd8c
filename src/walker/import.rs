use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value as Json;

use super::files::{collection_name, json_files_in, read_json};
use super::{SyncReport, WalkError, WalkResult, Walker};
use crate::normalize::split_id;
use crate::store::{CollectionRef, DocumentRef, DocumentStore};

impl<'a, S: DocumentStore + ?Sized> Walker<'a, S> {
    /// Syncs every `*.json` file directly inside `root` as a root-level
    /// collection. Nested folders are reached only through
    /// [`Walker::sync_file`].
    pub async fn import_folder(&self, root: &Path) -> WalkResult<SyncReport> {
        if !root.is_dir() {
            return Err(WalkError::MissingInput(root.to_path_buf()));
        }

        let mut report = SyncReport::default();
        for file in json_files_in(root)? {
            report += self.sync_file(file, None).await?;
        }
        Ok(report)
    }

    /// Mirrors one collection file into the store.
    ///
    /// Every document in the file is written in full (no merge). After each
    /// write, `<dir>/<collection>/<id>/*.json` is synced under that document.
    /// Documents present in the store but absent from the file are deleted
    /// along with their sub-collections.
    pub fn sync_file<'b>(
        &'b self,
        path: PathBuf,
        parent: Option<DocumentRef>,
    ) -> BoxFuture<'b, WalkResult<SyncReport>> {
        async move {
            let mut report = SyncReport::default();

            let name = collection_name(&path)?;
            let items = match read_json(&path)? {
                Json::Array(items) => items,
                _ => {
                    return Err(WalkError::Malformed(
                        path,
                        "expected a JSON array of documents".to_string(),
                    ))
                }
            };

            let collection = match &parent {
                Some(doc) => doc.collection(&name)?,
                None => CollectionRef::root(&name)?,
            };

            let existing: Vec<String> = self
                .store
                .get_documents(&collection)
                .await?
                .into_iter()
                .map(|doc| doc.id)
                .collect();

            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let mut incoming = HashSet::new();

            for item in items {
                let Json::Object(obj) = item else {
                    return Err(WalkError::Malformed(
                        path,
                        format!("non-object entry in {}", collection),
                    ));
                };
                let Some((id, fields)) = split_id(obj) else {
                    return Err(WalkError::Malformed(
                        path,
                        format!("document without a string id in {}", collection),
                    ));
                };

                let doc_ref = collection.doc(&id)?;
                self.store
                    .set_document(&doc_ref, self.normalizer.fields_to_native(&fields))
                    .await?;
                tracing::info!("Upserted {}", doc_ref);
                report.documents_written += 1;

                let doc_folder = dir.join(&name).join(&id);
                if doc_folder.is_dir() {
                    for sub_file in json_files_in(&doc_folder)? {
                        report += self.sync_file(sub_file, Some(doc_ref.clone())).await?;
                    }
                }

                incoming.insert(id);
            }

            for id in existing {
                if incoming.contains(&id) {
                    continue;
                }
                let doc_ref = collection.doc(&id)?;
                report.documents_deleted += self.delete_document(&doc_ref).await?;
                tracing::info!("Deleted {}", doc_ref);
            }

            report.collections += 1;
            tracing::info!("Synced collection {}", collection);
            Ok(report)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Timestamp, Value};
    use crate::normalize::Normalizer;
    use crate::store::MemoryStore;
    use crate::walker::test_support::{doc_ref, fields, put};
    use crate::walker::write_json;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sync_file_upserts_and_converts() {
        let store = MemoryStore::new();
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("users.json");
        write_json(
            &file,
            &json!([{
                "id": "1",
                "name": "A",
                "joined": "9/30/2025, 2:26:33 PM UTC+7",
                "sharedWith": {"a@x.com": true}
            }]),
        )
        .unwrap();

        let walker = Walker::new(&store, Normalizer::default());
        let report = walker.sync_file(file, None).await.unwrap();

        assert_eq!(report.documents_written, 1);
        assert_eq!(report.collections, 1);
        let joined = Timestamp::from_datetime(&Utc.with_ymd_and_hms(2025, 9, 30, 7, 26, 33).unwrap());
        assert_eq!(
            store.get(&doc_ref("users/1")),
            Some(fields(vec![
                ("joined", Value::Timestamp(joined)),
                ("name", Value::from("A")),
                ("sharedWith", Value::from(vec!["a@x.com"])),
            ]))
        );
    }

    #[tokio::test]
    async fn test_sync_file_replaces_fields_instead_of_merging() {
        let store = MemoryStore::new();
        put(
            &store,
            "users/1",
            vec![("name", Value::from("old")), ("stale", Value::Boolean(true))],
        )
        .await;

        let temp = TempDir::new().unwrap();
        let file = temp.path().join("users.json");
        write_json(&file, &json!([{"id": "1", "name": "new"}])).unwrap();

        let walker = Walker::new(&store, Normalizer::default());
        walker.sync_file(file, None).await.unwrap();

        assert_eq!(
            store.get(&doc_ref("users/1")),
            Some(fields(vec![("name", Value::from("new"))]))
        );
    }

    #[tokio::test]
    async fn test_sync_file_deletes_documents_missing_from_json() {
        let store = MemoryStore::new();
        put(&store, "users/1", vec![("name", Value::from("A"))]).await;
        put(&store, "users/2", vec![("name", Value::from("B"))]).await;
        put(&store, "users/2/orders/o", vec![]).await;

        let temp = TempDir::new().unwrap();
        let file = temp.path().join("users.json");
        write_json(&file, &json!([{"id": "1", "name": "A"}])).unwrap();

        let walker = Walker::new(&store, Normalizer::default());
        let report = walker.sync_file(file, None).await.unwrap();

        assert_eq!(report.documents_deleted, 2);
        assert_eq!(store.paths(), vec!["users/1".to_string()]);
    }

    #[tokio::test]
    async fn test_sync_file_descends_into_document_folders() {
        let store = MemoryStore::new();
        let temp = TempDir::new().unwrap();
        write_json(
            &temp.path().join("users.json"),
            &json!([{"id": "1"}, {"id": "2"}]),
        )
        .unwrap();
        write_json(
            &temp.path().join("users/1/orders.json"),
            &json!([{"id": "o1", "total": 3}]),
        )
        .unwrap();
        write_json(
            &temp.path().join("users/1/orders/o1/items.json"),
            &json!([{"id": "i1"}]),
        )
        .unwrap();
        // not named after any document: never visited
        write_json(&temp.path().join("users/9/orders.json"), &json!([{"id": "x"}])).unwrap();

        let walker = Walker::new(&store, Normalizer::default());
        let report = walker
            .sync_file(temp.path().join("users.json"), None)
            .await
            .unwrap();

        assert_eq!(report.collections, 3);
        assert_eq!(report.documents_written, 4);
        assert_eq!(
            store.paths(),
            vec![
                "users/1".to_string(),
                "users/1/orders/o1".to_string(),
                "users/1/orders/o1/items/i1".to_string(),
                "users/2".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_sync_file_under_parent() {
        let store = MemoryStore::new();
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("orders.json");
        write_json(&file, &json!([{"id": "o1"}])).unwrap();

        let walker = Walker::new(&store, Normalizer::default());
        walker
            .sync_file(file, Some(doc_ref("users/7")))
            .await
            .unwrap();

        assert_eq!(store.paths(), vec!["users/7/orders/o1".to_string()]);
    }

    #[tokio::test]
    async fn test_import_folder_only_reads_top_level_files() {
        let store = MemoryStore::new();
        let temp = TempDir::new().unwrap();
        write_json(&temp.path().join("teams.json"), &json!([{"id": "t"}])).unwrap();
        write_json(&temp.path().join("users.json"), &json!([{"id": "1"}])).unwrap();
        write_json(
            &temp.path().join("users/1/orders.json"),
            &json!([{"id": "o"}]),
        )
        .unwrap();
        write_json(&temp.path().join("stray/things.json"), &json!([{"id": "s"}])).unwrap();

        let walker = Walker::new(&store, Normalizer::default());
        let report = walker.import_folder(temp.path()).await.unwrap();

        assert_eq!(report.collections, 3);
        assert_eq!(
            store.paths(),
            vec![
                "teams/t".to_string(),
                "users/1".to_string(),
                "users/1/orders/o".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_import_folder_missing_root() {
        let store = MemoryStore::new();
        let temp = TempDir::new().unwrap();
        let walker = Walker::new(&store, Normalizer::default());

        let err = walker
            .import_folder(&temp.path().join("absent"))
            .await
            .unwrap_err();
        assert!(matches!(err, WalkError::MissingInput(_)));
    }

    #[tokio::test]
    async fn test_sync_file_rejects_malformed_input() {
        let store = MemoryStore::new();
        let temp = TempDir::new().unwrap();
        let walker = Walker::new(&store, Normalizer::default());

        let not_array = temp.path().join("a.json");
        write_json(&not_array, &json!({"id": "1"})).unwrap();
        assert!(matches!(
            walker.sync_file(not_array, None).await.unwrap_err(),
            WalkError::Malformed(_, _)
        ));

        let no_id = temp.path().join("b.json");
        write_json(&no_id, &json!([{"name": "x"}])).unwrap();
        assert!(matches!(
            walker.sync_file(no_id, None).await.unwrap_err(),
            WalkError::Malformed(_, _)
        ));

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_sync_file_keeps_unparseable_timestamp() {
        let store = MemoryStore::new();
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("events.json");
        write_json(
            &file,
            &json!([{"id": "e", "at": "2/30/2025, 1:00:00 PM UTC+7"}]),
        )
        .unwrap();

        let walker = Walker::new(&store, Normalizer::default());
        walker.sync_file(file, None).await.unwrap();

        assert_eq!(
            store.get(&doc_ref("events/e")),
            Some(fields(vec![("at", Value::from("2/30/2025, 1:00:00 PM UTC+7"))]))
        );
    }
}
