//! Application state management

use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::assets::uploader::AssetUploader;
use crate::blob::BlobStore;
use crate::fleet::reader::FleetReader;
use crate::server::state::ServerState;
use crate::stations::editor::StationEditor;
use crate::stations::registry::StationRegistry;
use crate::stations::repository::ConfigRepository;

/// Main application state
///
/// Every service shares the one store handle built at startup.
pub struct AppState {
    /// Shared storage backend
    pub store: Arc<dyn BlobStore>,

    /// Server heartbeat reader
    pub fleet: Arc<FleetReader>,

    /// Known stations
    pub registry: Arc<StationRegistry>,

    /// Station config documents
    pub configs: Arc<ConfigRepository>,

    /// Operator edits
    pub editor: Arc<StationEditor>,

    /// Template and action uploads
    pub uploader: Arc<AssetUploader>,
}

impl AppState {
    /// Initialize application state
    pub fn init(store: Arc<dyn BlobStore>, options: &AppOptions) -> Self {
        info!("Initializing application state on {}...", store.describe());

        let layout = options.layout.clone();
        let fleet = Arc::new(FleetReader::new(store.clone(), layout.clone()));
        let registry = Arc::new(StationRegistry::from_settings(
            &options.registry,
            store.clone(),
            layout.clone(),
        ));
        let configs = Arc::new(ConfigRepository::new(
            store.clone(),
            layout.clone(),
            options.cache_ttl,
        ));
        let editor = Arc::new(StationEditor::new(
            configs.clone(),
            options.reassignment_policy,
        ));
        let uploader = Arc::new(AssetUploader::new(store.clone(), layout));

        Self {
            store,
            fleet,
            registry,
            configs,
            editor,
            uploader,
        }
    }

    /// State handed to the HTTP handlers
    pub fn server_state(&self) -> ServerState {
        ServerState::new(
            self.fleet.clone(),
            self.registry.clone(),
            self.configs.clone(),
            self.editor.clone(),
            self.uploader.clone(),
            self.store.describe(),
        )
    }
}
