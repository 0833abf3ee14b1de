//! Settings file management

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ConsoleError;
use crate::filesys::file::File;
use crate::http::client::Endpoints;
use crate::logs::LogLevel;
use crate::reconcile::policy::ReassignmentPolicy;
use crate::stations::registry::validate_station_id;
use crate::storage::layout::GLOBAL_ASSETS_DIR;

/// Default settings file, relative to the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "fleet-console.json";

/// Console settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log_level: LogLevel,

    /// JSON log lines on stdout
    #[serde(default)]
    pub log_json: bool,

    /// Also write daily-rotated log files to this directory
    #[serde(default)]
    pub log_dir: Option<String>,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub stations: RegistrySettings,

    /// Folder holding shared actions and server health
    #[serde(default = "default_global_assets_dir")]
    pub global_assets_dir: String,

    #[serde(default)]
    pub reassignment_policy: ReassignmentPolicy,

    /// Read cache lifetime; 0 disables caching
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Largest accepted asset upload
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_global_assets_dir() -> String {
    GLOBAL_ASSETS_DIR.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    20
}

fn default_max_upload_mb() -> usize {
    50
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_json: false,
            log_dir: None,
            server: ServerSettings::default(),
            backend: BackendSettings::default(),
            stations: RegistrySettings::default(),
            global_assets_dir: default_global_assets_dir(),
            reassignment_policy: ReassignmentPolicy::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file does not exist
    pub async fn load(file: &File) -> Result<Self, ConsoleError> {
        if !file.exists().await {
            info!(
                "Settings file {} not found, using defaults",
                file.path().display()
            );
            return Ok(Self::default());
        }
        file.read_json().await
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConsoleError> {
        if self.server.host.trim().is_empty() {
            return Err(ConsoleError::ConfigError("server.host is empty".to_string()));
        }
        if self.max_upload_mb == 0 {
            return Err(ConsoleError::ConfigError(
                "max_upload_mb must be positive".to_string(),
            ));
        }
        if self.backend.kind == BackendKind::Local && self.backend.local_root.trim().is_empty() {
            return Err(ConsoleError::ConfigError(
                "backend.local_root is required for the local backend".to_string(),
            ));
        }
        self.backend.endpoints().validate()?;
        for station in &self.stations.known {
            validate_station_id(station)
                .map_err(|e| ConsoleError::ConfigError(format!("stations.known: {}", e)))?;
        }
        Ok(())
    }
}

/// Console HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which blob store backs the console
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Dropbox,
    Local,
}

/// Blob store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub kind: BackendKind,

    /// Root directory for the local backend
    #[serde(default)]
    pub local_root: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_content_base_url")]
    pub content_base_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    Endpoints::default().api_base_url
}

fn default_content_base_url() -> String {
    Endpoints::default().content_base_url
}

fn default_token_url() -> String {
    Endpoints::default().token_url
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            local_root: String::new(),
            api_base_url: default_api_base_url(),
            content_base_url: default_content_base_url(),
            token_url: default_token_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BackendSettings {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            api_base_url: self.api_base_url.clone(),
            content_base_url: self.content_base_url.clone(),
            token_url: self.token_url.clone(),
        }
    }
}

/// How the console learns which stations exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discovery {
    /// Use the configured station list
    #[default]
    Static,

    /// Every top-level folder holding a config document
    Probe,
}

/// Station registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySettings {
    #[serde(default)]
    pub discovery: Discovery,

    /// Known station ids; empty means the built-in fleet list
    #[serde(default)]
    pub known: Vec<String>,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            discovery: Discovery::Static,
            known: Vec::new(),
        }
    }
}
