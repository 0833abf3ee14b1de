//! Fleet snapshot and derived metrics

use chrono::{DateTime, Utc};
use fleet_models::{Membership, ServerHealthRecord};
use serde::Serialize;

use crate::blob::BlobError;

/// Free space above which a disk is healthy, in GB
pub const DISK_OK_GB: f64 = 20.0;

/// Free space above which a disk is low rather than critical, in GB
pub const DISK_LOW_GB: f64 = 10.0;

/// Free space that fills the disk gauge, in GB
pub const DISK_GAUGE_FULL_GB: f64 = 100.0;

/// Disk headroom classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskLevel {
    Ok,
    Low,
    Critical,
}

impl DiskLevel {
    pub fn from_free_gb(free_gb: f64) -> Self {
        if free_gb > DISK_OK_GB {
            DiskLevel::Ok
        } else if free_gb > DISK_LOW_GB {
            DiskLevel::Low
        } else {
            DiskLevel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiskLevel::Ok => "ok",
            DiskLevel::Low => "low",
            DiskLevel::Critical => "critical",
        }
    }
}

/// Gauge fill fraction in `[0, 1]`
pub fn disk_gauge(free_gb: f64) -> f64 {
    (free_gb / DISK_GAUGE_FULL_GB).clamp(0.0, 1.0)
}

/// Health records read in one pass over the health folder
#[derive(Debug, Clone, Serialize)]
pub struct FleetSnapshot {
    pub servers: Vec<ServerHealthRecord>,

    /// Records that could not be downloaded or parsed
    pub skipped: usize,

    /// Set when the health folder itself could not be listed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_error: Option<BlobError>,

    pub fetched_at: DateTime<Utc>,
}

impl FleetSnapshot {
    pub fn new(servers: Vec<ServerHealthRecord>, skipped: usize) -> Self {
        Self {
            servers,
            skipped,
            folder_error: None,
            fetched_at: Utc::now(),
        }
    }

    /// Empty snapshot standing in for an unreadable health folder
    pub fn unavailable(err: BlobError) -> Self {
        Self {
            servers: Vec::new(),
            skipped: 0,
            folder_error: Some(err),
            fetched_at: Utc::now(),
        }
    }

    /// Every record is treated as a live server
    pub fn online_count(&self) -> usize {
        self.servers.len()
    }

    pub fn avg_disk_free_gb(&self) -> Option<f64> {
        if self.servers.is_empty() {
            return None;
        }
        let total: f64 = self.servers.iter().map(|s| s.disk_free_gb()).sum();
        Some(total / self.servers.len() as f64)
    }

    /// Sorted, distinct, non-empty server ids
    pub fn online_server_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .servers
            .iter()
            .filter_map(|s| s.id())
            .map(str::to_string)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    pub fn is_online(&self, server_id: &str) -> bool {
        self.server(server_id).is_some()
    }

    /// Version reported by the first record
    pub fn manager_version(&self) -> Option<&str> {
        self.servers.first().and_then(|s| s.version.as_deref())
    }

    pub fn server(&self, server_id: &str) -> Option<&ServerHealthRecord> {
        self.servers.iter().find(|s| s.id() == Some(server_id))
    }

    /// Every server listing the station, with the list it appears in
    pub fn memberships(&self, station_id: &str) -> Vec<(String, Membership)> {
        self.servers
            .iter()
            .filter_map(|s| Some((s.id()?.to_string(), s.membership(station_id)?)))
            .collect()
    }
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct FleetMetrics {
    pub online_count: usize,
    pub avg_disk_free_gb: Option<f64>,
    pub manager_version: Option<String>,
    pub skipped: usize,
}

impl From<&FleetSnapshot> for FleetMetrics {
    fn from(snapshot: &FleetSnapshot) -> Self {
        Self {
            online_count: snapshot.online_count(),
            avg_disk_free_gb: snapshot.avg_disk_free_gb(),
            manager_version: snapshot.manager_version().map(str::to_string),
            skipped: snapshot.skipped,
        }
    }
}
