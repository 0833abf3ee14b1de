//! Reads the server health folder into a [`FleetSnapshot`]

use std::sync::Arc;

use fleet_models::ServerHealthRecord;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, warn};

use crate::blob::{self, path, BlobStore};
use crate::fleet::snapshot::FleetSnapshot;
use crate::storage::layout::StoreLayout;

/// Health files downloaded at once
const MAX_CONCURRENT_DOWNLOADS: usize = 8;

/// Fleet reader
pub struct FleetReader {
    store: Arc<dyn BlobStore>,
    layout: StoreLayout,
}

impl FleetReader {
    pub fn new(store: Arc<dyn BlobStore>, layout: StoreLayout) -> Self {
        Self { store, layout }
    }

    /// Download every heartbeat under the health folder
    ///
    /// A record that fails to download or parse is dropped and counted. A
    /// folder that cannot be listed yields an empty snapshot carrying the
    /// listing error.
    pub async fn get_fleet_data(&self) -> FleetSnapshot {
        let folder = self.layout.health_dir();
        let entries = match self.store.list(&folder).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to list health folder {}: {}", folder, e);
                return FleetSnapshot::unavailable(e);
            }
        };

        let paths: Vec<String> = entries
            .into_iter()
            .filter(|e| !e.is_folder && path::has_extension(&e.name, "json"))
            .map(|e| e.path)
            .collect();
        debug!("Reading {} health records from {}", paths.len(), folder);

        let store = self.store.as_ref();
        let results: Vec<_> = stream::iter(paths)
            .map(|p| async move {
                let result = blob::read_json::<ServerHealthRecord>(store, &p).await;
                (p, result)
            })
            .buffered(MAX_CONCURRENT_DOWNLOADS)
            .collect()
            .await;

        let mut servers = Vec::with_capacity(results.len());
        let mut skipped = 0;
        for (p, result) in results {
            match result {
                Ok(record) => servers.push(record),
                Err(e) => {
                    warn!("Skipping health record {}: {}", p, e);
                    skipped += 1;
                }
            }
        }

        FleetSnapshot::new(servers, skipped)
    }
}
