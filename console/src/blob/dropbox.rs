//! Dropbox-backed blob store

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::authn::token_mngr::TokenManagerExt;
use crate::blob::{path, BlobError, BlobStore, Entry};
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

/// Blob store over the Dropbox HTTP API
pub struct DropboxStore {
    http_client: Arc<HttpClient>,
    token_mngr: Arc<dyn TokenManagerExt>,
}

impl DropboxStore {
    pub fn new(http_client: Arc<HttpClient>, token_mngr: Arc<dyn TokenManagerExt>) -> Self {
        Self {
            http_client,
            token_mngr,
        }
    }

    async fn token(&self) -> Result<String, BlobError> {
        self.token_mngr
            .get_token()
            .await
            .map(|t| t.expose().to_string())
            .map_err(|e| BlobError::Access(e.to_string()))
    }

    /// Check the credentials work by listing the root folder
    pub async fn verify(&self) -> Result<(), ConsoleError> {
        let token = self.token_mngr.get_token().await?;
        self.http_client.list_folder(token.expose(), "/").await?;
        Ok(())
    }
}

/// Map an API failure for `store_path` onto the blob error taxonomy
///
/// The API reports missing paths as HTTP 409 with a `not_found` error summary.
pub fn map_api_error(store_path: &str, err: ConsoleError) -> BlobError {
    match err {
        ConsoleError::ApiError { status: 409, body } if body.contains("not_found") => {
            BlobError::NotFound(store_path.to_string())
        }
        ConsoleError::ApiError { status, body } => {
            BlobError::Access(format!("{}: HTTP {}: {}", store_path, status, body))
        }
        other => BlobError::Access(format!("{}: {}", store_path, other)),
    }
}

#[async_trait]
impl BlobStore for DropboxStore {
    async fn list(&self, folder: &str) -> Result<Vec<Entry>, BlobError> {
        let folder = path::normalize(folder)?;
        let token = self.token().await?;

        let mut page = self
            .http_client
            .list_folder(&token, &folder)
            .await
            .map_err(|e| map_api_error(&folder, e))?;
        let mut metadata = std::mem::take(&mut page.entries);

        while page.has_more {
            debug!("Listing {} continues", folder);
            page = self
                .http_client
                .list_folder_continue(&token, &page.cursor)
                .await
                .map_err(|e| map_api_error(&folder, e))?;
            metadata.append(&mut page.entries);
        }

        let mut entries: Vec<Entry> = metadata
            .into_iter()
            .filter(|m| !m.is_deleted())
            .map(|m| Entry {
                path: m
                    .path_display
                    .or(m.path_lower)
                    .unwrap_or_else(|| path::join(&folder, &m.name)),
                is_folder: m.tag == "folder",
                name: m.name,
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_bytes(&self, store_path: &str) -> Result<Vec<u8>, BlobError> {
        let store_path = path::normalize(store_path)?;
        let token = self.token().await?;

        self.http_client
            .download_file(&token, &store_path)
            .await
            .map_err(|e| map_api_error(&store_path, e))
    }

    async fn write_bytes(&self, store_path: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let store_path = path::normalize(store_path)?;
        let token = self.token().await?;

        self.http_client
            .upload_file(&token, &store_path, bytes.to_vec())
            .await
            .map(|_| ())
            .map_err(|e| map_api_error(&store_path, e))
    }

    fn describe(&self) -> String {
        format!("dropbox:{}", self.http_client.endpoints().api_base_url)
    }
}
