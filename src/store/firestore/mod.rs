//! Firestore REST backend.
//!
//! Talks to the v1 REST API:
//!
//! - `POST {base}[/{document}]:listCollectionIds` lists collections
//! - `GET {base}/{collection}` lists documents, paged
//! - `PATCH {base}/{document}` without an update mask replaces the document
//! - `DELETE {base}/{document}`
//!
//! where `base` is `{endpoint}/v1/projects/{project}/databases/{database}/documents`.
//! When an emulator host is configured the endpoint is plain HTTP and the
//! emulator's `owner` token is used; otherwise an externally minted OAuth
//! access token is sent as a bearer token.

pub mod value;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value as Json};

use super::{CollectionRef, DocumentRef, DocumentStore, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::models::{Document, Fields};

const PRODUCTION_ENDPOINT: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE: &str = "(default)";
const DEFAULT_PAGE_SIZE: usize = 300;
const EMULATOR_TOKEN: &str = "owner";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Json>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCollectionIdsResponse {
    #[serde(default)]
    collection_ids: Vec<String>,
    next_page_token: Option<String>,
}

/// Document store backed by the Firestore REST API.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
    page_size: usize,
}

impl FirestoreStore {
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let project = config
            .project_id
            .as_deref()
            .ok_or(StoreError::NotConfigured)?;
        let database = config.database_id.as_deref().unwrap_or(DEFAULT_DATABASE);

        let (endpoint, bearer) = match &config.emulator_host {
            Some(host) => (format!("http://{}", host), Some(EMULATOR_TOKEN.to_string())),
            None => (PRODUCTION_ENDPOINT.to_string(), config.access_token.clone()),
        };

        if bearer.is_none() {
            tracing::warn!("No access token configured; requests will be unauthenticated");
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: format!(
                "{}/v1/projects/{}/databases/{}/documents",
                endpoint, project, database
            ),
            bearer,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Overrides the page size used for listing calls.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a collection or document, each segment percent-encoded.
    fn url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.base_url, encoded.join("/"))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> StoreResult<Json> {
        let request = match &self.bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Json::Object(Map::new()));
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn list_collection_ids(&self, parent_url: &str) -> StoreResult<Vec<String>> {
        let url = format!("{}:listCollectionIds", parent_url);
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut body = json!({ "pageSize": self.page_size });
            if let Some(token) = &page_token {
                body["pageToken"] = Json::String(token.clone());
            }

            let response = self.send(self.client.post(&url).json(&body)).await?;
            let page: ListCollectionIdsResponse = serde_json::from_value(response)
                .map_err(|e| StoreError::Decode(e.to_string()))?;
            ids.extend(page.collection_ids);

            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                return Ok(ids);
            }
        }
    }
}

/// Pulls `error.message` out of a Google API error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Json>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list_collections(&self) -> StoreResult<Vec<CollectionRef>> {
        self.list_collection_ids(&self.base_url)
            .await?
            .iter()
            .map(|id| CollectionRef::root(id))
            .collect()
    }

    async fn get_documents(&self, collection: &CollectionRef) -> StoreResult<Vec<Document>> {
        let url = self.url(collection.path());
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", self.page_size.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self.send(self.client.get(&url).query(&query)).await?;
            let page: ListDocumentsResponse = serde_json::from_value(response)
                .map_err(|e| StoreError::Decode(e.to_string()))?;

            for raw in page.documents {
                let id = raw.name.rsplit('/').next().unwrap_or_default();
                documents.push(Document::new(id, value::decode_fields(&raw.fields)?));
            }

            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                return Ok(documents);
            }
        }
    }

    async fn list_subcollections(
        &self,
        document: &DocumentRef,
    ) -> StoreResult<Vec<CollectionRef>> {
        self.list_collection_ids(&self.url(document.path()))
            .await?
            .iter()
            .map(|id| document.collection(id))
            .collect()
    }

    async fn set_document(&self, document: &DocumentRef, fields: Fields) -> StoreResult<()> {
        let body = json!({ "fields": value::encode_fields(&fields) });
        self.send(self.client.patch(self.url(document.path())).json(&body))
            .await?;
        Ok(())
    }

    async fn delete_document(&self, document: &DocumentRef) -> StoreResult<()> {
        self.send(self.client.delete(self.url(document.path())))
            .await?;
        Ok(())
    }
}
