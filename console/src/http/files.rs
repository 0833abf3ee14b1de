//! Storage file API routes

use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

/// `files/list_folder` request
#[derive(Debug, Clone, Serialize)]
pub struct ListFolderRequest {
    /// Empty string for the root
    pub path: String,
    pub recursive: bool,
    pub include_deleted: bool,
}

/// `files/list_folder/continue` request
#[derive(Debug, Clone, Serialize)]
pub struct ListFolderContinueRequest {
    pub cursor: String,
}

/// One page of a folder listing
#[derive(Debug, Clone, Deserialize)]
pub struct ListFolderResponse {
    pub entries: Vec<Metadata>,
    pub cursor: String,
    pub has_more: bool,
}

/// File, folder, or deleted-entry metadata
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    #[serde(rename = ".tag")]
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
}

impl Metadata {
    pub fn is_folder(&self) -> bool {
        self.tag == "folder"
    }

    pub fn is_deleted(&self) -> bool {
        self.tag == "deleted"
    }
}

/// `files/download` argument
#[derive(Debug, Clone, Serialize)]
pub struct DownloadArg {
    pub path: String,
}

/// `files/upload` argument
#[derive(Debug, Clone, Serialize)]
pub struct UploadArg {
    pub path: String,
    pub mode: &'static str,
    pub autorename: bool,
    pub mute: bool,
}

impl UploadArg {
    /// Full overwrite of whatever is at `path`
    pub fn overwrite(path: &str) -> Self {
        Self {
            path: path.to_string(),
            mode: "overwrite",
            autorename: false,
            mute: true,
        }
    }
}

/// Storage API path for a normalized store path (root is the empty string)
pub fn api_path(store_path: &str) -> String {
    if store_path == "/" {
        String::new()
    } else {
        store_path.to_string()
    }
}

impl HttpClient {
    /// First page of a folder listing
    pub async fn list_folder(
        &self,
        token: &str,
        store_path: &str,
    ) -> Result<ListFolderResponse, ConsoleError> {
        let request = ListFolderRequest {
            path: api_path(store_path),
            recursive: false,
            include_deleted: false,
        };
        self.rpc("/files/list_folder", token, &request).await
    }

    /// Next page of a folder listing
    pub async fn list_folder_continue(
        &self,
        token: &str,
        cursor: &str,
    ) -> Result<ListFolderResponse, ConsoleError> {
        let request = ListFolderContinueRequest {
            cursor: cursor.to_string(),
        };
        self.rpc("/files/list_folder/continue", token, &request).await
    }

    /// Download a file's contents
    pub async fn download_file(&self, token: &str, store_path: &str) -> Result<Vec<u8>, ConsoleError> {
        let arg = DownloadArg {
            path: store_path.to_string(),
        };
        self.download("/files/download", token, &arg).await
    }

    /// Upload a file, overwriting
    pub async fn upload_file(
        &self,
        token: &str,
        store_path: &str,
        bytes: Vec<u8>,
    ) -> Result<Metadata, ConsoleError> {
        #[derive(Deserialize)]
        struct UploadResponse {
            name: String,
            #[serde(default)]
            path_lower: Option<String>,
            #[serde(default)]
            path_display: Option<String>,
        }

        let arg = UploadArg::overwrite(store_path);
        let response: UploadResponse = self.upload("/files/upload", token, &arg, bytes).await?;
        Ok(Metadata {
            tag: "file".to_string(),
            name: response.name,
            path_lower: response.path_lower,
            path_display: response.path_display,
        })
    }
}
