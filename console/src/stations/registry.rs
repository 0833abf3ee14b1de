//! Station registry
//!
//! Which stations the console manages: either a fixed list or every
//! top-level folder that holds a config document.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::blob::{BlobError, BlobStore};
use crate::errors::ConsoleError;
use crate::storage::layout::{StoreLayout, CONFIG_FILE_NAME};
use crate::storage::settings::{Discovery, RegistrySettings};

/// Fleet shipped with the console
pub const DEFAULT_STATIONS: [&str; 23] = [
    "DC Standard",
    "Dell Laptop",
    "Dell XPS",
    "DellNew1",
    "DellNew2",
    "DellNew3",
    "DellNew4",
    "HP_Envy",
    "HP1",
    "HP2",
    "HP3",
    "HP4",
    "Laptop 3",
    "Lenovo 1",
    "Lenovo 2",
    "Mini1BackUp",
    "Mini1Standard",
    "Mini2BackUp",
    "Mini2Standard",
    "Mini3",
    "Mini3BackUp",
    "Mini4Standard",
    "TXStandard",
];

const MAX_STATION_ID_LEN: usize = 128;

/// Folders probed at once during discovery
const MAX_CONCURRENT_PROBES: usize = 8;

/// Check that a station id names a single top-level folder
pub fn validate_station_id(station_id: &str) -> Result<(), ConsoleError> {
    let invalid = |reason: &str| {
        Err(ConsoleError::ValidationError(format!(
            "Invalid station id {:?}: {}",
            station_id, reason
        )))
    };

    if station_id.trim().is_empty() {
        return invalid("empty");
    }
    if station_id.trim() != station_id {
        return invalid("leading or trailing whitespace");
    }
    if station_id.len() > MAX_STATION_ID_LEN {
        return invalid("too long");
    }
    if station_id == "." || station_id == ".." {
        return invalid("relative path");
    }
    if station_id.contains(['/', '\\']) || station_id.chars().any(char::is_control) {
        return invalid("path separator or control character");
    }
    if station_id.starts_with('_') {
        return invalid("reserved name");
    }
    Ok(())
}

/// Known stations
pub enum StationRegistry {
    /// Sorted, distinct station ids
    Static(Vec<String>),

    /// Discovered from the store on every call
    Probe {
        store: Arc<dyn BlobStore>,
        layout: StoreLayout,
    },
}

impl StationRegistry {
    /// Fixed registry; falls back to [`DEFAULT_STATIONS`] when `known` is empty
    pub fn fixed(known: &[String]) -> Self {
        let mut ids: Vec<String> = if known.is_empty() {
            DEFAULT_STATIONS.iter().map(|s| s.to_string()).collect()
        } else {
            known.to_vec()
        };
        ids.sort();
        ids.dedup();
        StationRegistry::Static(ids)
    }

    pub fn from_settings(
        settings: &RegistrySettings,
        store: Arc<dyn BlobStore>,
        layout: StoreLayout,
    ) -> Self {
        match settings.discovery {
            Discovery::Static => Self::fixed(&settings.known),
            Discovery::Probe => StationRegistry::Probe { store, layout },
        }
    }

    /// Sorted station ids
    pub async fn station_ids(&self) -> Result<Vec<String>, BlobError> {
        match self {
            StationRegistry::Static(ids) => Ok(ids.clone()),
            StationRegistry::Probe { store, layout } => probe(store.as_ref(), layout).await,
        }
    }

    pub async fn contains(&self, station_id: &str) -> Result<bool, BlobError> {
        Ok(self.station_ids().await?.iter().any(|s| s == station_id))
    }

    /// Validate a station id from a request
    ///
    /// A fixed registry also rejects ids it does not list. Discovery accepts
    /// any well-formed id so new stations can be initialized.
    pub fn ensure_known(&self, station_id: &str) -> Result<(), ConsoleError> {
        validate_station_id(station_id)?;
        match self {
            StationRegistry::Static(ids) if !ids.iter().any(|s| s == station_id) => Err(
                ConsoleError::NotFound(format!("Unknown station: {}", station_id)),
            ),
            _ => Ok(()),
        }
    }
}

/// Every non-reserved top-level folder that holds a config document
async fn probe(store: &dyn BlobStore, layout: &StoreLayout) -> Result<Vec<String>, BlobError> {
    let candidates: Vec<String> = store
        .list("/")
        .await?
        .into_iter()
        .filter(|e| e.is_folder && !layout.is_reserved(&e.name))
        .filter(|e| validate_station_id(&e.name).is_ok())
        .map(|e| e.name)
        .collect();

    let found: Vec<Option<String>> = stream::iter(candidates)
        .map(|station| async move {
            match store.list(&layout.station_dir(&station)).await {
                Ok(entries) if entries.iter().any(|e| !e.is_folder && e.name == CONFIG_FILE_NAME) => {
                    Some(station)
                }
                Ok(_) => {
                    debug!("Folder {} has no config document", station);
                    None
                }
                Err(e) => {
                    warn!("Failed to probe station folder {}: {}", station, e);
                    None
                }
            }
        })
        .buffered(MAX_CONCURRENT_PROBES)
        .collect()
        .await;

    let mut ids: Vec<String> = found.into_iter().flatten().collect();
    ids.sort();
    Ok(ids)
}
