//! In-memory blob store with failure injection

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fleet_console::blob::{BlobError, BlobStore, Entry};
use fleet_models::{ServerHealthRecord, StationConfig};

#[derive(Default)]
struct Inner {
    blobs: BTreeMap<String, Vec<u8>>,
    writes: Vec<String>,
    failing: BTreeSet<String>,
}

/// Blob store backed by a map; paths under a failing prefix return `Access`
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> Arc<dyn BlobStore> {
        Arc::new(self.clone())
    }

    pub fn put(&self, path: &str, bytes: impl Into<Vec<u8>>) {
        let mut inner = self.inner.lock().unwrap();
        inner.blobs.insert(path.to_string(), bytes.into());
    }

    pub fn put_json<T: serde::Serialize>(&self, path: &str, value: &T) {
        self.put(path, serde_json::to_vec_pretty(value).unwrap());
    }

    pub fn put_config(&self, config: &StationConfig) {
        self.put_json(&format!("/{}/config.json", config.station_id), config);
    }

    pub fn put_health(&self, record: &ServerHealthRecord) {
        let id = record.server_id.clone().unwrap_or_default();
        self.put_json(&format!("/_Global_Assets/_Server_Health/{}.json", id), record);
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.inner.lock().unwrap().blobs.get(path).cloned()
    }

    pub fn get_json(&self, path: &str) -> serde_json::Value {
        serde_json::from_slice(&self.get(path).expect("blob exists")).unwrap()
    }

    /// Every successful write, in order
    pub fn writes(&self) -> Vec<String> {
        self.inner.lock().unwrap().writes.clone()
    }

    pub fn fail(&self, prefix: &str) {
        self.inner.lock().unwrap().failing.insert(prefix.to_string());
    }

    fn check(&self, path: &str) -> Result<(), BlobError> {
        let inner = self.inner.lock().unwrap();
        if inner.failing.iter().any(|p| path.starts_with(p.as_str())) {
            return Err(BlobError::Access(format!("{}: injected failure", path)));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn list(&self, folder: &str) -> Result<Vec<Entry>, BlobError> {
        self.check(folder)?;
        let prefix = if folder == "/" {
            "/".to_string()
        } else {
            format!("{}/", folder.trim_end_matches('/'))
        };

        let inner = self.inner.lock().unwrap();
        let mut entries: BTreeMap<String, Entry> = BTreeMap::new();
        for key in inner.blobs.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            let (name, is_folder) = match rest.split_once('/') {
                Some((dir, _)) => (dir, true),
                None => (rest, false),
            };
            entries.entry(name.to_string()).or_insert_with(|| Entry {
                name: name.to_string(),
                path: format!("{}{}", prefix, name),
                is_folder,
            });
        }

        if entries.is_empty() && folder != "/" {
            return Err(BlobError::NotFound(folder.to_string()));
        }
        Ok(entries.into_values().collect())
    }

    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, BlobError> {
        self.check(path)?;
        self.get(path)
            .ok_or_else(|| BlobError::NotFound(path.to_string()))
    }

    async fn write_bytes(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError> {
        self.check(path)?;
        let mut inner = self.inner.lock().unwrap();
        inner.blobs.insert(path.to_string(), bytes.to_vec());
        inner.writes.push(path.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

pub fn health(server_id: &str, active: &[&str]) -> ServerHealthRecord {
    ServerHealthRecord {
        server_id: Some(server_id.to_string()),
        status: Some("running".to_string()),
        active_stations: active.iter().map(|s| s.to_string()).collect(),
        disk_free_gb: Some(50.0),
        version: Some("2.4.1".to_string()),
        last_seen: Some("2025-06-01T12:00:00Z".to_string()),
        ..Default::default()
    }
}

pub fn assigned(station_id: &str, server: &str) -> StationConfig {
    let mut config = StationConfig::default_for(station_id);
    config.set_assigned_server(server);
    config
}
