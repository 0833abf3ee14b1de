//! Server state

use std::sync::Arc;

use crate::assets::uploader::AssetUploader;
use crate::fleet::reader::FleetReader;
use crate::stations::editor::StationEditor;
use crate::stations::registry::StationRegistry;
use crate::stations::repository::ConfigRepository;

/// Server state shared across handlers
pub struct ServerState {
    pub fleet: Arc<FleetReader>,
    pub registry: Arc<StationRegistry>,
    pub configs: Arc<ConfigRepository>,
    pub editor: Arc<StationEditor>,
    pub uploader: Arc<AssetUploader>,

    /// Backend description shown on the dashboard
    pub backend: String,
}

impl ServerState {
    pub fn new(
        fleet: Arc<FleetReader>,
        registry: Arc<StationRegistry>,
        configs: Arc<ConfigRepository>,
        editor: Arc<StationEditor>,
        uploader: Arc<AssetUploader>,
        backend: String,
    ) -> Self {
        Self {
            fleet,
            registry,
            configs,
            editor,
            uploader,
            backend,
        }
    }
}
