//! Template and action uploads

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::assets::sentinel;
use crate::blob::{path, BlobError, BlobStore};
use crate::errors::ConsoleError;
use crate::storage::layout::StoreLayout;
use crate::utils::sha256_hash;

/// Action file extension
pub const ACTION_EXTENSION: &str = "atn";

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Station template image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// `background[SUFFIX].jpg`
    Background,

    /// `overlay[SUFFIX].png`
    Overlay,
}

impl TemplateKind {
    pub fn stem(&self) -> &'static str {
        match self {
            TemplateKind::Background => "background",
            TemplateKind::Overlay => "overlay",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TemplateKind::Background => "jpg",
            TemplateKind::Overlay => "png",
        }
    }

    fn magic(&self) -> &'static [u8] {
        match self {
            TemplateKind::Background => JPEG_MAGIC,
            TemplateKind::Overlay => PNG_MAGIC,
        }
    }

    /// File name for an optional three-digit subfolder suffix
    pub fn file_name(&self, suffix: Option<&str>) -> Result<String, ConsoleError> {
        let suffix = validate_suffix(suffix)?;
        Ok(format!("{}{}.{}", self.stem(), suffix, self.extension()))
    }
}

impl std::str::FromStr for TemplateKind {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "background" => Ok(TemplateKind::Background),
            "overlay" => Ok(TemplateKind::Overlay),
            _ => Err(ConsoleError::ValidationError(format!(
                "Invalid template kind: {}",
                s
            ))),
        }
    }
}

/// Empty or exactly three ASCII digits
fn validate_suffix(suffix: Option<&str>) -> Result<&str, ConsoleError> {
    let suffix = suffix.map(str::trim).unwrap_or("");
    if suffix.is_empty() || (suffix.len() == 3 && suffix.bytes().all(|b| b.is_ascii_digit())) {
        Ok(suffix)
    } else {
        Err(ConsoleError::ValidationError(format!(
            "Template suffix must be three digits, got {:?}",
            suffix
        )))
    }
}

/// Where an action file lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionScope {
    /// Shared by every station
    Global,

    /// Private to one station
    Station(String),
}

impl ActionScope {
    pub fn from_station(station: Option<&str>) -> Self {
        match station.map(str::trim).filter(|s| !s.is_empty()) {
            Some(station) => ActionScope::Station(station.to_string()),
            None => ActionScope::Global,
        }
    }

    pub fn folder(&self, layout: &StoreLayout) -> String {
        match self {
            ActionScope::Global => layout.global_actions_dir(),
            ActionScope::Station(station) => layout.station_actions_dir(station),
        }
    }
}

/// Result of an upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub path: String,
    pub bytes: usize,
    pub sha256: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_path: Option<String>,

    /// Sentinel write failed after the asset itself was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_error: Option<String>,
}

impl UploadReceipt {
    fn new(path: String, payload: &[u8]) -> Self {
        Self {
            path,
            bytes: payload.len(),
            sha256: sha256_hash(payload),
            trigger_path: None,
            trigger_error: None,
        }
    }
}

/// Asset uploader
pub struct AssetUploader {
    store: Arc<dyn BlobStore>,
    layout: StoreLayout,
}

impl AssetUploader {
    pub fn new(store: Arc<dyn BlobStore>, layout: StoreLayout) -> Self {
        Self { store, layout }
    }

    /// Overwrite a station template
    pub async fn upload_template(
        &self,
        station_id: &str,
        kind: TemplateKind,
        suffix: Option<&str>,
        payload: &[u8],
    ) -> Result<UploadReceipt, ConsoleError> {
        let file_name = kind.file_name(suffix)?;
        if !payload.starts_with(kind.magic()) {
            return Err(ConsoleError::ValidationError(format!(
                "{} must be a .{} image",
                kind.stem(),
                kind.extension()
            )));
        }

        let target = path::join(&self.layout.templates_dir(station_id), &file_name);
        self.store.write_bytes(&target, payload).await?;
        info!("Uploaded {} ({} bytes)", target, payload.len());
        Ok(UploadReceipt::new(target, payload))
    }

    /// Upload an action file, optionally signalling a station to reload
    ///
    /// A failed sentinel write is reported in the receipt; the action stays.
    pub async fn upload_action(
        &self,
        scope: &ActionScope,
        name: &str,
        payload: &[u8],
        trigger: Option<&str>,
    ) -> Result<UploadReceipt, ConsoleError> {
        let file_name = action_file_name(name)?;
        if payload.is_empty() {
            return Err(ConsoleError::ValidationError(
                "Action file is empty".to_string(),
            ));
        }

        let target = path::join(&scope.folder(&self.layout), &file_name);
        self.store.write_bytes(&target, payload).await?;
        info!("Uploaded action {} ({} bytes)", target, payload.len());

        let mut receipt = UploadReceipt::new(target, payload);
        if let Some(station) = trigger {
            match sentinel::write_trigger(self.store.as_ref(), &self.layout, station).await {
                Ok(trigger_path) => receipt.trigger_path = Some(trigger_path),
                Err(e) => {
                    warn!("Action uploaded but trigger for {} failed: {}", station, e);
                    receipt.trigger_error = Some(e.to_string());
                }
            }
        }
        Ok(receipt)
    }

    /// Sorted action names, without extension
    pub async fn list_actions(&self, scope: &ActionScope) -> Result<Vec<String>, BlobError> {
        let entries = self.store.list(&scope.folder(&self.layout)).await?;
        let mut names: Vec<String> = entries
            .into_iter()
            .filter(|e| !e.is_folder && path::has_extension(&e.name, ACTION_EXTENSION))
            .map(|e| e.name[..e.name.len() - ACTION_EXTENSION.len() - 1].to_string())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Folder an action scope maps to
    pub fn folder(&self, scope: &ActionScope) -> String {
        scope.folder(&self.layout)
    }

    /// Write a sentinel without uploading anything
    pub async fn trigger(&self, station_id: &str) -> Result<String, BlobError> {
        sentinel::write_trigger(self.store.as_ref(), &self.layout, station_id).await
    }
}

/// `name.atn`, rejecting names with path separators
pub fn action_file_name(name: &str) -> Result<String, ConsoleError> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ConsoleError::ValidationError(format!(
            "Invalid action name: {:?}",
            name
        )));
    }
    if path::has_extension(name, ACTION_EXTENSION) {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.{}", name, ACTION_EXTENSION))
    }
}
