//! API response shapes

use chrono::{DateTime, Utc};
use fleet_models::{ActionRef, Membership, ServerHealthRecord, StationConfig};
use serde::Serialize;

use crate::fleet::snapshot::{disk_gauge, DiskLevel, FleetMetrics, FleetSnapshot};
use crate::reconcile::assignment::AssignmentMap;
use crate::reconcile::status::StationStatus;

/// One server card
#[derive(Debug, Clone, Serialize)]
pub struct ServerView {
    pub server_id: Option<String>,
    pub status: Option<String>,
    pub version: Option<String>,
    pub last_seen: Option<String>,
    pub disk_free_gb: f64,
    pub disk_level: DiskLevel,
    pub disk_gauge: f64,
    pub active_stations: Vec<String>,
    pub standby_stations: Vec<String>,
    pub unconfigured_stations: Vec<String>,
}

impl From<&ServerHealthRecord> for ServerView {
    fn from(record: &ServerHealthRecord) -> Self {
        let free = record.disk_free_gb();
        Self {
            server_id: record.id().map(str::to_string),
            status: record.status.clone(),
            version: record.version.clone(),
            last_seen: record.last_seen.clone(),
            disk_free_gb: free,
            disk_level: DiskLevel::from_free_gb(free),
            disk_gauge: disk_gauge(free),
            active_stations: record.active_stations.clone(),
            standby_stations: record.standby_stations.clone(),
            unconfigured_stations: record.unconfigured_stations.clone(),
        }
    }
}

/// `GET /api/fleet`
#[derive(Debug, Serialize)]
pub struct FleetResponse {
    pub metrics: FleetMetrics,
    pub online_server_ids: Vec<String>,
    pub servers: Vec<ServerView>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_error: Option<String>,

    pub fetched_at: DateTime<Utc>,
}

impl From<&FleetSnapshot> for FleetResponse {
    fn from(snapshot: &FleetSnapshot) -> Self {
        Self {
            metrics: FleetMetrics::from(snapshot),
            online_server_ids: snapshot.online_server_ids(),
            servers: snapshot.servers.iter().map(ServerView::from).collect(),
            folder_error: snapshot.folder_error.as_ref().map(|e| e.to_string()),
            fetched_at: snapshot.fetched_at,
        }
    }
}

/// One row of the station list
#[derive(Debug, Clone, Serialize)]
pub struct StationSummary {
    pub station_id: String,

    /// `None` when the config could not be read
    pub status: Option<StationStatus>,
    pub status_label: String,
    pub assigned_server: Option<String>,
    pub station_enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /api/stations`
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub server_filter: Option<String>,
    pub stations: Vec<StationSummary>,
    pub assignments: AssignmentMap,
}

/// Config document as shown to the operator, with the API key removed
#[derive(Debug, Serialize)]
pub struct ConfigView {
    pub document: StationConfig,
    pub api_key_configured: bool,
    pub effective: EffectiveConfig,
}

/// Config values with defaults applied
#[derive(Debug, Serialize)]
pub struct EffectiveConfig {
    pub station_enabled: bool,
    pub assigned_server: String,
    pub remove_background: bool,
    pub temperature: i64,
    pub orientation_mode: String,
    pub portrait: Option<ActionRef>,
    pub landscape: Option<ActionRef>,
    pub subfolder_action_set: String,
}

impl From<&StationConfig> for ConfigView {
    fn from(config: &StationConfig) -> Self {
        let settings = config.settings();
        let profile = config.root_profile().cloned().unwrap_or_default();

        let mut document = config.clone();
        if let Some(Some(settings)) = document.settings.as_mut() {
            settings.remove_bg_api_key = None;
        }

        Self {
            document,
            api_key_configured: settings.has_api_key(),
            effective: EffectiveConfig {
                station_enabled: config.is_enabled(),
                assigned_server: config.assigned_server().to_string(),
                remove_background: settings.remove_background(),
                temperature: settings.temperature(),
                orientation_mode: settings.orientation_mode().to_string(),
                portrait: profile.portrait().cloned(),
                landscape: profile.landscape().cloned(),
                subfolder_action_set: config.subfolder_action_set().to_string(),
            },
        }
    }
}

/// Where a server lists the station
#[derive(Debug, Serialize)]
pub struct MembershipView {
    pub server_id: String,
    pub membership: Membership,
}

/// `GET /api/stations/{id}`
#[derive(Debug, Serialize)]
pub struct StationDetail {
    pub station_id: String,
    pub path: String,
    pub status: StationStatus,
    pub status_label: String,
    pub config: ConfigView,
    pub assignment_options: Vec<String>,
    pub reassignment_policy: String,
    pub memberships: Vec<MembershipView>,
}

/// `GET /api/actions`
#[derive(Debug, Serialize)]
pub struct ActionsResponse {
    pub folder: String,
    pub actions: Vec<String>,
}
