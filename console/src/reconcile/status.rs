//! Display status of a station

use fleet_models::StationConfig;
use serde::Serialize;

use crate::fleet::snapshot::FleetSnapshot;

/// Derived station status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StationStatus {
    /// Switched off in its config
    Disabled,

    /// Not bound to any server
    Unassigned,

    /// Bound to a server that published no heartbeat
    Offline,

    /// Bound server lists the station as active
    Online,

    /// Bound server is up but has not picked the station up yet
    Syncing,
}

impl StationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StationStatus::Disabled => "Disabled",
            StationStatus::Unassigned => "Unassigned",
            StationStatus::Offline => "Offline (server missing)",
            StationStatus::Online => "Online",
            StationStatus::Syncing => "Syncing",
        }
    }

    /// CSS class used by the dashboard
    pub fn css_class(&self) -> &'static str {
        match self {
            StationStatus::Disabled | StationStatus::Unassigned => "muted",
            StationStatus::Offline => "bad",
            StationStatus::Online => "good",
            StationStatus::Syncing => "warn",
        }
    }
}

impl std::fmt::Display for StationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Reconcile a station config against the fleet snapshot
///
/// `station_id` is the folder the config was read from; documents are not
/// required to carry their own id.
///
/// Rules apply in order: disabled, unassigned, server missing, active on its
/// server, otherwise syncing.
pub fn reconcile(
    station_id: &str,
    config: &StationConfig,
    snapshot: &FleetSnapshot,
) -> StationStatus {
    if !config.is_enabled() {
        return StationStatus::Disabled;
    }
    if !config.is_assigned() {
        return StationStatus::Unassigned;
    }

    match snapshot.server(config.assigned_server()) {
        None => StationStatus::Offline,
        Some(server) if server.is_active(station_id) => StationStatus::Online,
        Some(_) => StationStatus::Syncing,
    }
}
