//! HTTP client for a hosted document-store endpoint.
//!
//! Wire protocol, all JSON:
//! - `GET    {base}/{path}/{id}`          → document body, 404 when absent
//! - `POST   {base}/{path}:query`         → `[{id, data}]`
//! - `POST   {base}/{path}`               → `{"id": "..."}` (auto id)
//! - `PUT    {base}/{path}/{id}`          → keyed upsert
//! - `POST   {base}/{path}/{id}`          → keyed insert, 409 on conflict
//! - `PATCH  {base}/{path}/{id}`          → field ops, 404 when absent
//! - `DELETE {base}/{path}/{id}`
//!
//! Server-timestamp sentinels are passed through for the remote store to
//! resolve at write time.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::{Document, DocumentStore, FieldOp, Query};

pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct InsertResponse {
    id: String,
}

impl RestStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn doc_url(&self, path: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, path, id)
    }

    fn collection_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn check(
        &self,
        response: reqwest::Response,
        context: &str,
    ) -> StoreResult<reqwest::Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(context.to_string())),
            StatusCode::CONFLICT => Err(StoreError::Conflict(context.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::debug!("store rejected {}: {} {}", context, status, body);
                Err(StoreError::Backend(format!(
                    "{context}: status {status}: {body}"
                )))
            }
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for RestStore {
    async fn get(&self, path: &str, id: &str) -> StoreResult<Option<Value>> {
        let response = self.client.get(self.doc_url(path, id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = self.check(response, &format!("get {path}/{id}")).await?;
        Ok(Some(response.json().await?))
    }

    async fn query(&self, path: &str, query: Query) -> StoreResult<Vec<Document>> {
        let response = self
            .client
            .post(format!("{}:query", self.collection_url(path)))
            .json(&query)
            .send()
            .await?;
        let response = self.check(response, &format!("query {path}")).await?;
        Ok(response.json().await?)
    }

    async fn insert(&self, path: &str, data: Value) -> StoreResult<String> {
        let response = self
            .client
            .post(self.collection_url(path))
            .json(&data)
            .send()
            .await?;
        let response = self.check(response, &format!("insert {path}")).await?;
        let body: InsertResponse = response.json().await?;
        Ok(body.id)
    }

    async fn set(&self, path: &str, id: &str, data: Value) -> StoreResult<()> {
        let response = self
            .client
            .put(self.doc_url(path, id))
            .json(&data)
            .send()
            .await?;
        self.check(response, &format!("set {path}/{id}")).await?;
        Ok(())
    }

    async fn create(&self, path: &str, id: &str, data: Value) -> StoreResult<()> {
        let response = self
            .client
            .post(self.doc_url(path, id))
            .json(&data)
            .send()
            .await?;
        self.check(response, &format!("create {path}/{id}")).await?;
        Ok(())
    }

    async fn update(&self, path: &str, id: &str, ops: Vec<FieldOp>) -> StoreResult<()> {
        let response = self
            .client
            .patch(self.doc_url(path, id))
            .json(&ops)
            .send()
            .await?;
        self.check(response, &format!("update {path}/{id}")).await?;
        Ok(())
    }

    async fn delete(&self, path: &str, id: &str) -> StoreResult<()> {
        let response = self.client.delete(self.doc_url(path, id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            // deleting an absent document is not an error
            return Ok(());
        }
        self.check(response, &format!("delete {path}/{id}")).await?;
        Ok(())
    }
}
