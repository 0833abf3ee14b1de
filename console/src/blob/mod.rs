//! Blob store abstraction
//!
//! The console's only view of shared storage. Every operation returns an
//! explicit [`BlobError`] so callers can tell a missing document from a
//! failed read or a malformed one.

pub mod dropbox;
pub mod local;
pub mod path;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

/// One entry of a folder listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    pub path: String,
    pub is_folder: bool,
}

/// Storage operation failure
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum BlobError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage access failed: {0}")]
    Access(String),

    #[error("Invalid JSON at {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl BlobError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlobError::NotFound(_))
    }
}

/// Key-value blob store with folder listing
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// List a folder, sorted by name
    async fn list(&self, folder: &str) -> Result<Vec<Entry>, BlobError>;

    /// Download a whole blob
    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, BlobError>;

    /// Upload a whole blob, overwriting any existing one
    async fn write_bytes(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError>;

    /// Short human-readable description of the backend
    fn describe(&self) -> String;
}

/// Download and parse a JSON document
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn BlobStore,
    path: &str,
) -> Result<T, BlobError> {
    let bytes = store.read_bytes(path).await.inspect_err(|e| {
        if !e.is_not_found() {
            warn!("Download failed: {}: {}", path, e);
        }
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        warn!("Invalid JSON: {}: {}", path, e);
        BlobError::Parse {
            path: path.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Serialize as pretty JSON and upload, overwriting
pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn BlobStore,
    path: &str,
    value: &T,
) -> Result<(), BlobError> {
    let payload = serde_json::to_vec_pretty(value).map_err(|e| BlobError::Parse {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    store
        .write_bytes(path, &payload)
        .await
        .inspect_err(|e| warn!("Upload failed: {}: {}", path, e))
}
