//! Whole-database export and import.

use std::path::Path;

use serde_json::{Map, Value as Json};

use crate::normalize::Normalizer;
use crate::store::{CollectionRef, DocumentStore};
use crate::walker::{dir_has_entries, read_json, write_json, SyncReport, WalkError, WalkResult, Walker};

/// Runs full exports and imports against one store.
///
/// The store is borrowed for the driver's lifetime; nothing is global.
pub struct SyncDriver<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    walker: Walker<'a, S>,
}

impl<'a, S: DocumentStore + ?Sized> SyncDriver<'a, S> {
    pub fn new(store: &'a S, normalizer: Normalizer) -> Self {
        Self {
            store,
            walker: Walker::new(store, normalizer),
        }
    }

    /// Exports every root collection into `root` in folder mode.
    ///
    /// Files already in `root` are overwritten but never removed. A file
    /// left from an earlier export brings its documents back on the next
    /// full import, so export into an empty folder when a snapshot is
    /// wanted.
    pub async fn full_export(&self, root: &Path) -> WalkResult<SyncReport> {
        if dir_has_entries(root) {
            tracing::warn!(
                "{} is not empty; files from earlier exports are kept",
                root.display()
            );
        }

        let mut report = SyncReport::default();
        for collection in self.store.list_collections().await? {
            report += self.walker.export_collection(&collection, root).await?;
        }
        tracing::info!(
            "All collections (including subcollections) exported to {}",
            root.display()
        );
        Ok(report)
    }

    /// Deletes every document in every root collection, sub-collections
    /// included. Returns the number of documents deleted.
    ///
    /// There is no rollback: a failure leaves the store partially emptied.
    pub async fn wipe_all(&self) -> WalkResult<usize> {
        let mut deleted = 0;
        for collection in self.store.list_collections().await? {
            deleted += self.walker.delete_collection(&collection).await?;
        }
        tracing::info!("All collections deleted");
        Ok(deleted)
    }

    /// Empties the store, then mirrors the folder tree at `root` into it.
    ///
    /// `root` is checked before anything is deleted.
    pub async fn full_import(&self, root: &Path) -> WalkResult<SyncReport> {
        if !root.is_dir() {
            return Err(WalkError::MissingInput(root.to_path_buf()));
        }

        tracing::warn!("Deleting all collections before import");
        let deleted = self.wipe_all().await?;

        tracing::info!("Importing JSON from {}", root.display());
        let mut report = self.walker.import_folder(root).await?;
        report.documents_deleted += deleted;
        Ok(report)
    }

    /// Writes the whole database as one nested JSON object keyed by root
    /// collection name.
    pub async fn export_structure(&self, file: &Path) -> WalkResult<SyncReport> {
        let mut report = SyncReport::default();
        let mut structure = Map::new();

        for collection in self.store.list_collections().await? {
            let (documents, collected) = self.walker.collect_collection(&collection).await?;
            if documents.is_empty() {
                continue;
            }
            structure.insert(collection.id().to_string(), Json::Array(documents));
            report += collected;
        }

        write_json(file, &Json::Object(structure))?;
        report.files_written += 1;
        tracing::info!("Exported database structure to {}", file.display());
        Ok(report)
    }

    /// Upserts a structure snapshot. Nothing is deleted.
    pub async fn import_structure(&self, file: &Path) -> WalkResult<SyncReport> {
        let Json::Object(collections) = read_json(file)? else {
            return Err(WalkError::Malformed(
                file.to_path_buf(),
                "expected an object keyed by collection name".to_string(),
            ));
        };

        let mut report = SyncReport::default();
        for (name, documents) in collections {
            let Json::Array(documents) = documents else {
                return Err(WalkError::Malformed(
                    file.to_path_buf(),
                    format!("collection {} is not an array", name),
                ));
            };
            let collection = CollectionRef::root(&name)?;
            report += self
                .walker
                .import_documents(collection, documents, file)
                .await?;
        }

        tracing::info!("Import completed");
        Ok(report)
    }
}
