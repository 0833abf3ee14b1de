//! Operator edits to station configs
//!
//! Each edit loads the current document, applies the change, and saves once
//! only when the document actually changed.

use std::sync::Arc;

use fleet_models::{
    ActionRef, OrientationMode, StationConfig, DEFAULT_ACTION_SET, TEMPERATURE_MAX,
    TEMPERATURE_MIN, UNASSIGNED,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::blob::BlobError;
use crate::errors::ConsoleError;
use crate::reconcile::policy::ReassignmentPolicy;
use crate::stations::repository::ConfigRepository;

/// Enable switch and server assignment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentUpdate {
    pub station_enabled: Option<bool>,
    pub assigned_server: Option<String>,
}

/// Image-processing settings; omitted fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub remove_background: Option<bool>,

    /// Empty string clears the key
    pub remove_bg_api_key: Option<String>,

    pub temperature: Option<i64>,
    pub orientation_mode: Option<String>,
}

/// Action reference as submitted by the operator
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRefUpdate {
    #[serde(default)]
    pub action_set: Option<String>,
    pub action_name: String,
}

/// Root photo actions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilesUpdate {
    pub portrait: Option<ActionRefUpdate>,
    pub landscape: Option<ActionRefUpdate>,
}

/// Action set for numbered event subfolders
#[derive(Debug, Clone, Deserialize)]
pub struct SubfolderUpdate {
    pub subfolder_action_set: String,
}

/// Result of an edit
#[derive(Debug, Clone, Serialize)]
pub struct EditOutcome {
    pub station_id: String,
    pub path: String,

    /// False when the request matched the stored document and nothing was written
    pub changed: bool,

    #[serde(skip)]
    pub config: StationConfig,
}

/// Applies operator edits through the config repository
pub struct StationEditor {
    repo: Arc<ConfigRepository>,
    policy: ReassignmentPolicy,
}

impl StationEditor {
    pub fn new(repo: Arc<ConfigRepository>, policy: ReassignmentPolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> ReassignmentPolicy {
        self.policy
    }

    /// Change the enable switch and/or the assigned server
    ///
    /// `online` is the sorted list of servers with a heartbeat.
    pub async fn update_assignment(
        &self,
        station_id: &str,
        update: &AssignmentUpdate,
        online: &[String],
    ) -> Result<EditOutcome, ConsoleError> {
        self.edit(station_id, |config| {
            if let Some(target) = update.assigned_server.as_deref() {
                let target = match target.trim() {
                    "" => UNASSIGNED,
                    t => t,
                };
                let current = config.assigned_server().to_string();
                self.policy.check(&current, target, online)?;
                if target != current {
                    info!("Reassigning {}: {} -> {}", station_id, current, target);
                    config.set_assigned_server(target);
                }
            }
            if let Some(enabled) = update.station_enabled {
                if enabled != config.is_enabled() {
                    config.set_enabled(enabled);
                }
            }
            Ok(())
        })
        .await
    }

    pub async fn update_settings(
        &self,
        station_id: &str,
        update: &SettingsUpdate,
    ) -> Result<EditOutcome, ConsoleError> {
        let orientation = update
            .orientation_mode
            .as_deref()
            .map(str::parse::<OrientationMode>)
            .transpose()
            .map_err(ConsoleError::ValidationError)?;

        if let Some(temperature) = update.temperature {
            if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&temperature) {
                return Err(ConsoleError::ValidationError(format!(
                    "Temperature {} outside {}..={}",
                    temperature, TEMPERATURE_MIN, TEMPERATURE_MAX
                )));
            }
        }

        self.edit(station_id, |config| {
            let current = config.settings();
            let api_key = update.remove_bg_api_key.as_deref().map(str::trim);

            if let Some(value) = update
                .remove_background
                .filter(|v| *v != current.remove_background())
            {
                config.settings_mut().set_remove_background(value);
            }
            if let Some(key) =
                api_key.filter(|k| current.api_key().unwrap_or("") != *k)
            {
                config.settings_mut().set_api_key(key);
            }
            if let Some(value) = update.temperature.filter(|v| *v != current.temperature()) {
                config.settings_mut().set_temperature(value);
            }
            if let Some(mode) = orientation.filter(|m| *m != current.orientation_mode()) {
                config.settings_mut().set_orientation_mode(mode);
            }
            Ok(())
        })
        .await
    }

    /// Set the root photo actions under whichever profile key the document uses
    pub async fn update_profiles(
        &self,
        station_id: &str,
        update: &ProfilesUpdate,
    ) -> Result<EditOutcome, ConsoleError> {
        let portrait = update.portrait.as_ref().map(to_action_ref).transpose()?;
        let landscape = update.landscape.as_ref().map(to_action_ref).transpose()?;

        self.edit(station_id, |config| {
            let unchanged = |current: Option<&ActionRef>, next: &ActionRef| {
                current.is_some_and(|c| {
                    c.action_name() == next.action_name() && c.action_set() == next.action_set()
                })
            };

            let existing = config.root_profile().cloned().unwrap_or_default();
            let needs_portrait = portrait
                .as_ref()
                .is_some_and(|p| !unchanged(existing.portrait(), p));
            let needs_landscape = landscape
                .as_ref()
                .is_some_and(|l| !unchanged(existing.landscape(), l));
            if !needs_portrait && !needs_landscape {
                return Ok(());
            }

            let profile = config.root_profile_mut();
            if let Some(action) = portrait.filter(|_| needs_portrait) {
                profile.set_portrait(action);
            }
            if let Some(action) = landscape.filter(|_| needs_landscape) {
                profile.set_landscape(action);
            }
            Ok(())
        })
        .await
    }

    pub async fn update_subfolder(
        &self,
        station_id: &str,
        update: &SubfolderUpdate,
    ) -> Result<EditOutcome, ConsoleError> {
        let action_set = update.subfolder_action_set.trim();
        if action_set.is_empty() {
            return Err(ConsoleError::ValidationError(
                "subfolder_action_set is empty".to_string(),
            ));
        }

        self.edit(station_id, |config| {
            if config.subfolder_action_set() != action_set {
                config.set_subfolder_action_set(action_set);
            }
            Ok(())
        })
        .await
    }

    /// Load the stored document, apply `change`, and save if it changed
    async fn edit<F>(&self, station_id: &str, change: F) -> Result<EditOutcome, ConsoleError>
    where
        F: FnOnce(&mut StationConfig) -> Result<(), ConsoleError>,
    {
        let (original, path) = self.repo.load_fresh(station_id).await.map_err(|e| match e {
            BlobError::NotFound(path) => {
                ConsoleError::NotFound(format!("No config for {} at {}", station_id, path))
            }
            other => other.into(),
        })?;

        let mut config = original.clone();
        change(&mut config)?;

        if config == original {
            debug!("No changes for {}", station_id);
            return Ok(EditOutcome {
                station_id: station_id.to_string(),
                path,
                changed: false,
                config,
            });
        }

        let path = self.repo.save(station_id, &config).await?;
        Ok(EditOutcome {
            station_id: station_id.to_string(),
            path,
            changed: true,
            config,
        })
    }
}

fn to_action_ref(update: &ActionRefUpdate) -> Result<ActionRef, ConsoleError> {
    let name = update.action_name.trim();
    if name.contains(['/', '\\']) {
        return Err(ConsoleError::ValidationError(format!(
            "Invalid action name: {}",
            name
        )));
    }
    let set = update
        .action_set
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_ACTION_SET);
    Ok(ActionRef::new(set, name))
}
