//! Table store adapter for a PostgREST endpoint (`{base}/rest/v1/{table}`).

mod query;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, Url};
use serde_json::Value;

use crate::domain::{
    ports::outbound::{RowKey, SelectQuery, Table, TableStore},
    StoreError,
};

use self::query::{key_param, rejection_message, select_params};

#[derive(Debug, Clone)]
pub struct RestTableStore {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl RestTableStore {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, StoreError> {
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| StoreError::Transport(format!("invalid store URL {base_url}: {e}")))?;
        let client = Client::builder().build().map_err(StoreError::transport)?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn table_url(&self, table: Table) -> Result<Url, StoreError> {
        self.base_url
            .join(&format!("rest/v1/{}", table.name()))
            .map_err(|e| StoreError::Transport(format!("failed to build URL for {table}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder
                .header("apikey", key)
                .header(header::AUTHORIZATION, format!("Bearer {key}"));
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder.send().await.map_err(StoreError::transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected(rejection_message(status.as_u16(), &body)))
    }

    async fn rows(response: Response) -> Result<Vec<Value>, StoreError> {
        let body = response.text().await.map_err(StoreError::transport)?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl TableStore for RestTableStore {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Value>, StoreError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().extend_pairs(select_params(query));

        tracing::debug!(%table, %url, "Selecting rows");
        let response = self.send(self.request(Method::GET, url)).await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Vec<Value>, StoreError> {
        let url = self.table_url(table)?;

        tracing::debug!(%table, "Inserting row");
        let request = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&[row]);
        let response = self.send(request).await?;
        Self::rows(response).await
    }

    async fn update(
        &self,
        table: Table,
        key: RowKey,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().extend_pairs([key_param(key)]);

        tracing::debug!(%table, key = key.value, "Updating row");
        let request = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = self.send(request).await?;
        Self::rows(response).await
    }

    async fn delete(&self, table: Table, key: RowKey) -> Result<(), StoreError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().extend_pairs([key_param(key)]);

        tracing::debug!(%table, key = key.value, "Deleting row");
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
