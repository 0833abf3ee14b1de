//! Station config repository
//!
//! Loads and saves `/{station}/config.json`. Reads may be served from a short
//! TTL cache; every save through the repository drops the station's entry.

use std::sync::Arc;
use std::time::Duration;

use fleet_models::StationConfig;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::blob::{self, BlobError, BlobStore};
use crate::cache::ttl::TtlCache;
use crate::errors::ConsoleError;
use crate::storage::layout::StoreLayout;

/// Cached configs at most
const CACHE_CAPACITY: usize = 256;

/// Configs downloaded at once by [`ConfigRepository::load_many`]
const MAX_CONCURRENT_LOADS: usize = 8;

/// Config repository
pub struct ConfigRepository {
    store: Arc<dyn BlobStore>,
    layout: StoreLayout,
    cache: TtlCache<StationConfig>,
}

impl ConfigRepository {
    pub fn new(store: Arc<dyn BlobStore>, layout: StoreLayout, cache_ttl: Duration) -> Self {
        Self {
            store,
            layout,
            cache: TtlCache::new(cache_ttl, CACHE_CAPACITY),
        }
    }

    pub fn path_for(&self, station_id: &str) -> String {
        self.layout.config_file(station_id)
    }

    /// Load a station's config and the path it was read from
    pub async fn load(&self, station_id: &str) -> Result<(StationConfig, String), BlobError> {
        let path = self.path_for(station_id);
        if let Some(config) = self.cache.get(station_id) {
            debug!("Config cache hit: {}", station_id);
            return Ok((config, path));
        }

        let config: StationConfig = blob::read_json(self.store.as_ref(), &path).await?;
        self.cache.insert(station_id, config.clone());
        Ok((config, path))
    }

    /// Load a station's config straight from the store, bypassing the cache
    pub async fn load_fresh(&self, station_id: &str) -> Result<(StationConfig, String), BlobError> {
        self.cache.invalidate(station_id);
        self.load(station_id).await
    }

    /// Load several configs, in input order
    pub async fn load_many(
        &self,
        station_ids: &[String],
    ) -> Vec<(String, Result<StationConfig, BlobError>)> {
        stream::iter(station_ids.iter().cloned())
            .map(|station| async move {
                let result = self.load(&station).await.map(|(config, _)| config);
                (station, result)
            })
            .buffered(MAX_CONCURRENT_LOADS)
            .collect()
            .await
    }

    /// Overwrite the station's config document
    ///
    /// A document carrying a different `station_id` is rejected.
    pub async fn save(&self, station_id: &str, config: &StationConfig) -> Result<String, ConsoleError> {
        if !config.station_id.is_empty() && config.station_id != station_id {
            return Err(ConsoleError::ValidationError(format!(
                "Config belongs to {}, not {}",
                config.station_id, station_id
            )));
        }

        let path = self.path_for(station_id);
        self.cache.invalidate(station_id);
        blob::write_json(self.store.as_ref(), &path, config).await?;
        info!("Saved config for {} to {}", station_id, path);
        Ok(path)
    }

    /// Write the canonical default document for a station
    pub async fn create_default(&self, station_id: &str) -> Result<StationConfig, ConsoleError> {
        let config = StationConfig::default_for(station_id);
        self.save(station_id, &config).await?;
        Ok(config)
    }

    /// Create the default document unless one already exists
    ///
    /// A readable document is never replaced. A malformed one is replaced
    /// only with `force`.
    pub async fn initialize(
        &self,
        station_id: &str,
        force: bool,
    ) -> Result<StationConfig, ConsoleError> {
        match self.load_fresh(station_id).await {
            Ok((_, path)) => Err(ConsoleError::Conflict(format!(
                "Config already exists at {}",
                path
            ))),
            Err(BlobError::NotFound(_)) => self.create_default(station_id).await,
            Err(BlobError::Parse { path, reason }) if force => {
                warn!("Replacing malformed config {}: {}", path, reason);
                self.create_default(station_id).await
            }
            Err(BlobError::Parse { path, .. }) => Err(ConsoleError::Conflict(format!(
                "Config at {} is malformed; retry with force to replace it",
                path
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }
}
