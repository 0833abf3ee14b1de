//! Station to server assignment map

use std::collections::BTreeMap;

use fleet_models::StationConfig;
use serde::Serialize;

/// Which stations each server owns, from readable station configs
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssignmentMap {
    pub assigned_to_server: BTreeMap<String, String>,

    /// Station lists are sorted
    pub server_to_stations: BTreeMap<String, Vec<String>>,
}

impl AssignmentMap {
    /// Build from `(station_id, config)` pairs; unassigned stations are left out
    pub fn build<'a, I>(configs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a StationConfig)>,
    {
        let mut map = AssignmentMap::default();
        for (station, config) in configs {
            if !config.is_assigned() {
                continue;
            }
            let server = config.assigned_server().to_string();
            map.assigned_to_server
                .insert(station.to_string(), server.clone());
            map.server_to_stations
                .entry(server)
                .or_default()
                .push(station.to_string());
        }
        for stations in map.server_to_stations.values_mut() {
            stations.sort();
            stations.dedup();
        }
        map
    }

    pub fn server_of(&self, station_id: &str) -> Option<&str> {
        self.assigned_to_server.get(station_id).map(String::as_str)
    }

    /// Stations offered in the selector
    ///
    /// Without a filter, every known station. With one, the server's stations
    /// plus every station not assigned anywhere, sorted and distinct.
    pub fn selectable(&self, known: &[String], server_filter: Option<&str>) -> Vec<String> {
        let Some(server) = server_filter else {
            return known.to_vec();
        };

        let mut stations: Vec<String> = self
            .server_to_stations
            .get(server)
            .cloned()
            .unwrap_or_default();
        stations.extend(
            known
                .iter()
                .filter(|s| self.server_of(s).is_none())
                .cloned(),
        );
        stations.sort();
        stations.dedup();
        stations
    }
}
