/// Remote persistence for the glossary file.
///
/// The store contract is deliberately small: `load` the whole table, `save`
/// the whole table as an overwrite. Callers that mutate must load
/// immediately before saving; there is no locking here, so two concurrent
/// writers can lose an update (at-most-one in-flight writer is the caller's
/// responsibility).
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::csv::{decode_table, encode_table, CodecError};
use super::{GlossaryRecord, GlossaryTable};
use crate::config::DropboxConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("glossary store rejected the credentials: {0}")]
    Auth(String),
    #[error("glossary store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("glossary store returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error(transparent)]
    Malformed(#[from] CodecError),
}

/// Narrow seam over the persisted glossary blob.
///
/// Errors propagate to the orchestrator; there is no cache to fall back to,
/// so a failing store visibly aborts the step that needed it.
#[async_trait]
pub trait GlossaryStore: Send + Sync {
    async fn load(&self) -> Result<GlossaryTable, StoreError>;
    async fn save(&self, table: &GlossaryTable) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: GlossaryStore + ?Sized> GlossaryStore for std::sync::Arc<T> {
    async fn load(&self) -> Result<GlossaryTable, StoreError> {
        (**self).load().await
    }

    async fn save(&self, table: &GlossaryTable) -> Result<(), StoreError> {
        (**self).save(table).await
    }
}

/// Dropbox-backed store. Every operation fetches a fresh short-lived access
/// token via the OAuth2 refresh-token grant, then hits the content API.
pub struct DropboxStore {
    http: Client,
    config: DropboxConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl DropboxStore {
    pub fn new(config: &DropboxConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build glossary store client");
        Self {
            http,
            config: config.clone(),
        }
    }

    async fn access_token(&self) -> Result<String, StoreError> {
        let response = self
            .http
            .post(format!("{}/oauth2/token", self.config.api_base_url))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.config.refresh_token.as_str()),
                ("client_id", self.config.app_key.as_str()),
                ("client_secret", self.config.app_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("{status}: {body}")));
        }

        let token = response.json::<TokenResponse>().await?;
        Ok(token.access_token)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            return Err(StoreError::Auth(body));
        }
        Err(StoreError::Api { status, body })
    }
}

#[async_trait]
impl GlossaryStore for DropboxStore {
    async fn load(&self) -> Result<GlossaryTable, StoreError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(format!("{}/2/files/download", self.config.content_base_url))
            .bearer_auth(&token)
            .header(
                "Dropbox-API-Arg",
                serde_json::json!({ "path": self.config.glossary_path }).to_string(),
            )
            .send()
            .await?;
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        let rows = decode_table(&bytes)?;
        log::debug!(
            "loaded {} glossary rows from {}",
            rows.len(),
            self.config.glossary_path
        );
        Ok(GlossaryTable::from_rows(rows))
    }

    async fn save(&self, table: &GlossaryTable) -> Result<(), StoreError> {
        let token = self.access_token().await?;
        let body = encode_table(table.rows())?;
        let response = self
            .http
            .post(format!("{}/2/files/upload", self.config.content_base_url))
            .bearer_auth(&token)
            .header(
                "Dropbox-API-Arg",
                serde_json::json!({
                    "path": self.config.glossary_path,
                    "mode": "overwrite",
                })
                .to_string(),
            )
            .header("Content-Type", "application/octet-stream")
            .body(body)
            .send()
            .await?;
        Self::check(response).await?;
        log::debug!(
            "saved {} glossary rows to {}",
            table.len(),
            self.config.glossary_path
        );
        Ok(())
    }
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<GlossaryRecord>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new(rows: Vec<GlossaryRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            saves: Mutex::new(0),
        }
    }

    pub fn rows(&self) -> Vec<GlossaryRecord> {
        self.rows.lock().expect("memory store poisoned").clone()
    }

    /// Number of times `save` has been called, for append-only assertions.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().expect("memory store poisoned")
    }
}

#[async_trait]
impl GlossaryStore for MemoryStore {
    async fn load(&self) -> Result<GlossaryTable, StoreError> {
        let rows = self.rows.lock().expect("memory store poisoned").clone();
        Ok(GlossaryTable::from_rows(rows))
    }

    async fn save(&self, table: &GlossaryTable) -> Result<(), StoreError> {
        *self.rows.lock().expect("memory store poisoned") = table.rows().to_vec();
        *self.saves.lock().expect("memory store poisoned") += 1;
        Ok(())
    }
}
