//! HTTP client for a PostgREST-style table endpoint.
//!
//! Rows are addressed by `user_id`; upserts rely on the server's
//! `merge-duplicates` conflict resolution on that column.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use super::remote::{RemoteBackend, RemoteError, RemoteRecord};
use crate::config::RemoteConfig;

const SELECT_COLUMNS: &str = "user_id,data,last_updated";

/// Remote backend speaking the PostgREST REST dialect.
#[derive(Debug, Clone)]
pub struct RestRemote {
    base_url: String,
    api_key: Option<String>,
    table: String,
    client: Client,
}

impl RestRemote {
    /// Creates a client from config.
    ///
    /// Returns an error if no remote URL is configured.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let url = config.url.clone().ok_or(RemoteError::NotConfigured)?;
        Ok(Self::new(url, config.api_key.clone(), config.table.clone()))
    }

    pub fn new(base_url: impl Into<String>, api_key: Option<String>, table: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            table: table.into(),
            client: Client::new(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn upsert_url(&self) -> String {
        format!("{}?on_conflict=user_id", self.table_url())
    }

    fn fetch_url(&self, user_id: &str) -> String {
        format!(
            "{}?user_id=eq.{}&select={}",
            self.table_url(),
            urlencoding::encode(user_id),
            SELECT_COLUMNS
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }
}

async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::ServerError {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RemoteBackend for RestRemote {
    async fn upsert(&self, record: &RemoteRecord) -> Result<(), RemoteError> {
        let request = self
            .client
            .post(self.upsert_url())
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(record);

        let response = self.authorize(request).send().await?;
        check_status(response).await?;

        tracing::debug!("Upserted remote record for {}", record.user_id);
        Ok(())
    }

    async fn fetch(&self, user_id: &str) -> Result<Option<RemoteRecord>, RemoteError> {
        let request = self.client.get(self.fetch_url(user_id));

        let response = self.authorize(request).send().await?;
        let rows: Vec<RemoteRecord> = check_status(response).await?.json().await?;

        Ok(rows.into_iter().next())
    }
}
