use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{CollectionRef, DocumentRef, DocumentStore, StoreResult};
use crate::models::{Document, Fields};

/// In-memory document store.
///
/// Documents are kept in a single map keyed by full document path. A
/// collection exists while at least one document lives somewhere below it,
/// so sub-collections may hang off documents that were never written, the
/// same way Firestore allows.
pub struct MemoryStore {
    documents: RwLock<BTreeMap<String, Fields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of documents at any depth.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }

    /// Fields of a single document, if present.
    pub fn get(&self, document: &DocumentRef) -> Option<Fields> {
        self.documents
            .read()
            .expect("lock poisoned")
            .get(document.path())
            .cloned()
    }

    /// Sorted paths of every stored document.
    pub fn paths(&self) -> Vec<String> {
        self.documents
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Distinct next segments of every path below `prefix`.
    fn child_segments(&self, prefix: &str) -> BTreeSet<String> {
        let map = self.documents.read().expect("lock poisoned");
        map.range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .filter_map(|(path, _)| path[prefix.len()..].split('/').next())
            .map(String::from)
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("document_count", &self.len())
            .finish()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_collections(&self) -> StoreResult<Vec<CollectionRef>> {
        self.child_segments("")
            .iter()
            .map(|name| CollectionRef::root(name))
            .collect()
    }

    async fn get_documents(&self, collection: &CollectionRef) -> StoreResult<Vec<Document>> {
        let prefix = format!("{}/", collection.path());
        let map = self.documents.read().expect("lock poisoned");
        let docs = map
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| !path[prefix.len()..].contains('/'))
            .map(|(path, fields)| Document::new(&path[prefix.len()..], fields.clone()))
            .collect();
        Ok(docs)
    }

    async fn list_subcollections(
        &self,
        document: &DocumentRef,
    ) -> StoreResult<Vec<CollectionRef>> {
        let prefix = format!("{}/", document.path());
        self.child_segments(&prefix)
            .iter()
            .map(|name| document.collection(name))
            .collect()
    }

    async fn set_document(&self, document: &DocumentRef, fields: Fields) -> StoreResult<()> {
        let mut map = self.documents.write().expect("lock poisoned");
        map.insert(document.path().to_string(), fields);
        Ok(())
    }

    async fn delete_document(&self, document: &DocumentRef) -> StoreResult<()> {
        let mut map = self.documents.write().expect("lock poisoned");
        map.remove(document.path());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn doc_ref(path: &str) -> DocumentRef {
        DocumentRef::parse(path).unwrap()
    }

    fn name_fields(name: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), Value::from(name));
        fields
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_and_get_documents() {
        let store = MemoryStore::new();
        store
            .set_document(&doc_ref("users/2"), name_fields("B"))
            .await
            .unwrap();
        store
            .set_document(&doc_ref("users/1"), name_fields("A"))
            .await
            .unwrap();

        let users = CollectionRef::root("users").unwrap();
        let docs = store.get_documents(&users).await.unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(docs[0].fields, name_fields("A"));
    }

    #[tokio::test]
    async fn test_set_replaces_all_fields() {
        let store = MemoryStore::new();
        let path = doc_ref("users/1");
        let mut first = name_fields("A");
        first.insert("age".to_string(), Value::Integer(3));
        store.set_document(&path, first).await.unwrap();
        store.set_document(&path, name_fields("B")).await.unwrap();

        assert_eq!(store.get(&path), Some(name_fields("B")));
    }

    #[tokio::test]
    async fn test_get_documents_excludes_nested() {
        let store = MemoryStore::new();
        store
            .set_document(&doc_ref("users/1"), Fields::new())
            .await
            .unwrap();
        store
            .set_document(&doc_ref("users/1/orders/a"), Fields::new())
            .await
            .unwrap();
        store
            .set_document(&doc_ref("usersx/9"), Fields::new())
            .await
            .unwrap();

        let users = CollectionRef::root("users").unwrap();
        let docs = store.get_documents(&users).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "1");
    }

    #[tokio::test]
    async fn test_list_collections_and_subcollections() {
        let store = MemoryStore::new();
        for path in [
            "users/1",
            "users/1/orders/a",
            "users/1/orders/b",
            "users/1/notes/n",
            "users/10/orders/c",
            "teams/t",
        ] {
            store
                .set_document(&doc_ref(path), Fields::new())
                .await
                .unwrap();
        }

        let roots: Vec<String> = store
            .list_collections()
            .await
            .unwrap()
            .iter()
            .map(|c| c.path().to_string())
            .collect();
        assert_eq!(roots, vec!["teams", "users"]);

        let subs: Vec<String> = store
            .list_subcollections(&doc_ref("users/1"))
            .await
            .unwrap()
            .iter()
            .map(|c| c.path().to_string())
            .collect();
        assert_eq!(subs, vec!["users/1/notes", "users/1/orders"]);

        assert!(store
            .list_subcollections(&doc_ref("teams/t"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_subcollection_under_missing_parent() {
        let store = MemoryStore::new();
        store
            .set_document(&doc_ref("users/ghost/orders/a"), Fields::new())
            .await
            .unwrap();

        let users = CollectionRef::root("users").unwrap();
        assert!(store.get_documents(&users).await.unwrap().is_empty());

        let subs = store
            .list_subcollections(&doc_ref("users/ghost"))
            .await
            .unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id(), "orders");
    }

    #[tokio::test]
    async fn test_delete_does_not_cascade() {
        let store = MemoryStore::new();
        store
            .set_document(&doc_ref("users/1"), Fields::new())
            .await
            .unwrap();
        store
            .set_document(&doc_ref("users/1/orders/a"), Fields::new())
            .await
            .unwrap();

        store.delete_document(&doc_ref("users/1")).await.unwrap();
        store.delete_document(&doc_ref("users/404")).await.unwrap();

        assert_eq!(store.paths(), vec!["users/1/orders/a".to_string()]);
    }
}
