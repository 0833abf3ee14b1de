//! Shared storage layout
//!
//! Where every document and asset lives inside the blob store.

use crate::blob::path;

/// Default global assets folder
pub const GLOBAL_ASSETS_DIR: &str = "/_Global_Assets";

/// Station config document name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Storage layout for the fleet
#[derive(Debug, Clone)]
pub struct StoreLayout {
    /// Folder holding shared actions and server health
    pub global_assets_dir: String,
}

impl StoreLayout {
    pub fn new(global_assets_dir: impl Into<String>) -> Self {
        let dir = global_assets_dir.into();
        let dir = path::normalize(&dir).unwrap_or_else(|_| GLOBAL_ASSETS_DIR.to_string());
        Self {
            global_assets_dir: dir,
        }
    }

    /// Shared `.atn` action files
    pub fn global_actions_dir(&self) -> String {
        path::join(&self.global_assets_dir, "Actions")
    }

    /// One heartbeat JSON per server
    pub fn health_dir(&self) -> String {
        path::join(&self.global_assets_dir, "_Server_Health")
    }

    /// Top-level folder of a station
    pub fn station_dir(&self, station_id: &str) -> String {
        path::join("/", station_id)
    }

    pub fn config_file(&self, station_id: &str) -> String {
        path::join(&self.station_dir(station_id), CONFIG_FILE_NAME)
    }

    pub fn templates_dir(&self, station_id: &str) -> String {
        path::join(&self.station_dir(station_id), "templates")
    }

    /// Per-station `.atn` action files
    pub fn station_actions_dir(&self, station_id: &str) -> String {
        path::join(&self.station_dir(station_id), "actions")
    }

    /// Root photo intake folder watched by the supervisor
    pub fn incoming_dir(&self, station_id: &str) -> String {
        path::join(&self.station_dir(station_id), "incoming")
    }

    /// Whether a top-level folder name is reserved for shared assets
    pub fn is_reserved(&self, folder_name: &str) -> bool {
        folder_name.starts_with('_') || path::join("/", folder_name) == self.global_assets_dir
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::new(GLOBAL_ASSETS_DIR)
    }
}
