//! Directory-backed blob store
//!
//! Serves a local copy of the storage tree, e.g. a synced Dropbox folder.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::blob::{path, BlobError, BlobStore, Entry};
use crate::errors::ConsoleError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// Blob store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: Dir,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Dir::new(root),
        }
    }

    pub fn root(&self) -> &Dir {
        &self.root
    }

    fn resolve(&self, store_path: &str) -> Result<(String, PathBuf), BlobError> {
        let normalized = path::normalize(store_path)?;
        let relative = normalized.trim_start_matches('/');
        let local = if relative.is_empty() {
            self.root.path().to_path_buf()
        } else {
            self.root.path().join(relative)
        };
        Ok((normalized, local))
    }
}

fn map_error(store_path: &str, err: ConsoleError) -> BlobError {
    match err {
        ConsoleError::IoError(e) if e.kind() == ErrorKind::NotFound => {
            BlobError::NotFound(store_path.to_string())
        }
        other => BlobError::Access(format!("{}: {}", store_path, other)),
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn list(&self, folder: &str) -> Result<Vec<Entry>, BlobError> {
        let (normalized, local) = self.resolve(folder)?;
        debug!("LIST {}", local.display());

        let entries = Dir::new(local)
            .list_entries()
            .await
            .map_err(|e| map_error(&normalized, e))?;

        Ok(entries
            .into_iter()
            .map(|entry| Entry {
                path: path::join(&normalized, &entry.name),
                name: entry.name,
                is_folder: entry.is_dir,
            })
            .collect())
    }

    async fn read_bytes(&self, store_path: &str) -> Result<Vec<u8>, BlobError> {
        let (normalized, local) = self.resolve(store_path)?;
        debug!("READ {}", local.display());

        let file = File::new(local);
        if !file.exists().await {
            return Err(BlobError::NotFound(normalized));
        }
        file.read_bytes()
            .await
            .map_err(|e| map_error(&normalized, e))
    }

    async fn write_bytes(&self, store_path: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let (normalized, local) = self.resolve(store_path)?;
        if normalized == "/" {
            return Err(BlobError::Access("Cannot write to the store root".to_string()));
        }
        debug!("WRITE {} ({} bytes)", local.display(), bytes.len());

        File::new(local)
            .write_atomic(bytes)
            .await
            .map_err(|e| map_error(&normalized, e))
    }

    fn describe(&self) -> String {
        format!("local:{}", self.root.path().display())
    }
}
