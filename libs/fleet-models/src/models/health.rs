//! Server heartbeat documents
//!
//! Each supervisor periodically overwrites one file under the health folder.
//! Every field is optional on the wire.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;

/// Latest heartbeat published by one supervisor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerHealthRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,

    /// Free-text status label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "de::string_list")]
    pub active_stations: Vec<String>,

    #[serde(default, deserialize_with = "de::string_list")]
    pub standby_stations: Vec<String>,

    #[serde(default, deserialize_with = "de::string_list")]
    pub unconfigured_stations: Vec<String>,

    #[serde(
        default,
        deserialize_with = "de::lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub disk_free_gb: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How a supervisor currently lists a station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    Active,
    Standby,
    Unconfigured,
}

impl ServerHealthRecord {
    /// Server id, if present and non-empty
    pub fn id(&self) -> Option<&str> {
        self.server_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Free disk in GB, 0 when unreported
    pub fn disk_free_gb(&self) -> f64 {
        self.disk_free_gb.unwrap_or(0.0)
    }

    pub fn is_active(&self, station_id: &str) -> bool {
        self.active_stations.iter().any(|s| s == station_id)
    }

    /// First list the station appears in, checked active, standby, unconfigured
    pub fn membership(&self, station_id: &str) -> Option<Membership> {
        if self.is_active(station_id) {
            Some(Membership::Active)
        } else if self.standby_stations.iter().any(|s| s == station_id) {
            Some(Membership::Standby)
        } else if self.unconfigured_stations.iter().any(|s| s == station_id) {
            Some(Membership::Unconfigured)
        } else {
            None
        }
    }
}
