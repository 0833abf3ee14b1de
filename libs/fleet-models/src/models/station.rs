//! Station configuration documents
//!
//! One `config.json` per station folder. Fields that are absent on disk stay
//! absent after a load/save cycle, and unknown fields are carried through
//! untouched, so the console never rewrites parts of the document it does
//! not own.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;

/// Assignment sentinel for a station not bound to any server
pub const UNASSIGNED: &str = "Unassigned";

/// Action set used for profile references created without one
pub const DEFAULT_ACTION_SET: &str = "Photobooth_Actions";

/// Action set applied to numbered event subfolders by default
pub const DEFAULT_SUBFOLDER_ACTION_SET: &str = "Event_Subfolders";

/// Temperature adjustment bounds
pub const TEMPERATURE_MIN: i64 = -100;
pub const TEMPERATURE_MAX: i64 = 100;

/// Per-station configuration document
///
/// Nullable fields are `Option<Option<T>>`: the outer `None` is an absent
/// key, `Some(None)` an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub station_id: String,

    /// Master switch; absent means enabled
    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub station_enabled: Option<Option<bool>>,

    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub assigned_server: Option<Option<String>>,

    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub settings: Option<Option<StationSettings>>,

    /// Root photo actions, older documents
    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub active_profile: Option<Option<ProfileActions>>,

    /// Root photo actions, newer documents
    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub root_actions: Option<Option<ProfileActions>>,

    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub subfolder_action_set: Option<Option<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Image-processing settings block
///
/// `temperature` and `orientation_mode` keep whatever value the document
/// holds; the accessors read them leniently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationSettings {
    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub remove_background: Option<Option<bool>>,

    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub remove_bg_api_key: Option<Option<String>>,

    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Value>,

    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub orientation_mode: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Portrait/landscape action pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileActions {
    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub portrait: Option<Option<ActionRef>>,

    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub landscape: Option<Option<ActionRef>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to an externally defined action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRef {
    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub action_set: Option<Option<String>>,

    #[serde(default, deserialize_with = "de::present", skip_serializing_if = "Option::is_none")]
    pub action_name: Option<Option<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Orientation handling for incoming photos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrientationMode {
    #[default]
    Auto,
    ForcePortrait,
    ForceLandscape,
}

impl OrientationMode {
    pub const ALL: [OrientationMode; 3] = [
        OrientationMode::Auto,
        OrientationMode::ForcePortrait,
        OrientationMode::ForceLandscape,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrientationMode::Auto => "auto",
            OrientationMode::ForcePortrait => "force_portrait",
            OrientationMode::ForceLandscape => "force_landscape",
        }
    }
}

impl std::fmt::Display for OrientationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrientationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(OrientationMode::Auto),
            "force_portrait" => Ok(OrientationMode::ForcePortrait),
            "force_landscape" => Ok(OrientationMode::ForceLandscape),
            _ => Err(format!("Invalid orientation mode: {}", s)),
        }
    }
}

impl Serialize for OrientationMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl ActionRef {
    pub fn new(action_set: impl Into<String>, action_name: impl Into<String>) -> Self {
        Self {
            action_set: Some(Some(action_set.into())),
            action_name: Some(Some(action_name.into())),
            extra: Map::new(),
        }
    }

    pub fn action_name(&self) -> &str {
        self.action_name.as_ref().and_then(Option::as_deref).unwrap_or("")
    }

    pub fn action_set(&self) -> &str {
        self.action_set
            .as_ref()
            .and_then(Option::as_deref)
            .unwrap_or(DEFAULT_ACTION_SET)
    }
}

impl ProfileActions {
    pub fn portrait(&self) -> Option<&ActionRef> {
        self.portrait.as_ref().and_then(Option::as_ref)
    }

    pub fn landscape(&self) -> Option<&ActionRef> {
        self.landscape.as_ref().and_then(Option::as_ref)
    }

    pub fn set_portrait(&mut self, action: ActionRef) {
        self.portrait = Some(Some(action));
    }

    pub fn set_landscape(&mut self, action: ActionRef) {
        self.landscape = Some(Some(action));
    }
}

impl StationSettings {
    pub fn remove_background(&self) -> bool {
        self.remove_background.flatten().unwrap_or(false)
    }

    pub fn set_remove_background(&mut self, value: bool) {
        self.remove_background = Some(Some(value));
    }

    pub fn api_key(&self) -> Option<&str> {
        self.remove_bg_api_key.as_ref().and_then(Option::as_deref)
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.remove_bg_api_key = Some(Some(key.into()));
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some_and(|key| !key.is_empty())
    }

    /// Effective temperature, clamped to the supported range
    pub fn temperature(&self) -> i64 {
        self.temperature
            .as_ref()
            .and_then(de::lenient_i64)
            .unwrap_or(0)
            .clamp(TEMPERATURE_MIN, TEMPERATURE_MAX)
    }

    pub fn set_temperature(&mut self, value: i64) {
        self.temperature = Some(Value::from(value));
    }

    /// Stored mode, case-insensitive; anything unrecognized reads as `auto`
    pub fn orientation_mode(&self) -> OrientationMode {
        self.orientation_mode
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_orientation_mode(&mut self, mode: OrientationMode) {
        self.orientation_mode = Some(Value::from(mode.as_str()));
    }
}

impl StationConfig {
    /// Canonical document for a freshly initialized station
    pub fn default_for(station_id: &str) -> Self {
        let action = || Some(Some(ActionRef::new(DEFAULT_ACTION_SET, "")));
        let mut settings = StationSettings::default();
        settings.set_remove_background(false);
        settings.set_api_key("");
        settings.set_temperature(0);
        settings.set_orientation_mode(OrientationMode::Auto);

        Self {
            station_id: station_id.to_string(),
            station_enabled: Some(Some(true)),
            assigned_server: Some(Some(UNASSIGNED.to_string())),
            settings: Some(Some(settings)),
            active_profile: None,
            root_actions: Some(Some(ProfileActions {
                portrait: action(),
                landscape: action(),
                extra: Map::new(),
            })),
            subfolder_action_set: Some(Some(DEFAULT_SUBFOLDER_ACTION_SET.to_string())),
            extra: Map::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.station_enabled.flatten().unwrap_or(true)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.station_enabled = Some(Some(enabled));
    }

    /// Assigned server id, or [`UNASSIGNED`] when absent or blank
    pub fn assigned_server(&self) -> &str {
        match self
            .assigned_server
            .as_ref()
            .and_then(Option::as_deref)
            .map(str::trim)
        {
            Some(server) if !server.is_empty() => server,
            _ => UNASSIGNED,
        }
    }

    pub fn set_assigned_server(&mut self, server: impl Into<String>) {
        self.assigned_server = Some(Some(server.into()));
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_server() != UNASSIGNED
    }

    /// Settings block, or an all-defaults view when the document has none
    pub fn settings(&self) -> StationSettings {
        self.settings.clone().flatten().unwrap_or_default()
    }

    pub fn settings_mut(&mut self) -> &mut StationSettings {
        self.settings
            .get_or_insert(None)
            .get_or_insert_with(StationSettings::default)
    }

    /// Root photo actions; `root_actions` wins over `active_profile`
    pub fn root_profile(&self) -> Option<&ProfileActions> {
        self.root_actions
            .as_ref()
            .and_then(Option::as_ref)
            .or_else(|| self.active_profile.as_ref().and_then(Option::as_ref))
    }

    /// Mutable root photo actions under whichever key the document already
    /// uses, creating `root_actions` when neither holds a profile
    pub fn root_profile_mut(&mut self) -> &mut ProfileActions {
        let has_root = matches!(self.root_actions, Some(Some(_)));
        if !has_root {
            if let Some(Some(profile)) = self.active_profile.as_mut() {
                return profile;
            }
        }
        self.root_actions
            .get_or_insert(None)
            .get_or_insert_with(ProfileActions::default)
    }

    pub fn subfolder_action_set(&self) -> &str {
        self.subfolder_action_set
            .as_ref()
            .and_then(Option::as_deref)
            .unwrap_or(DEFAULT_SUBFOLDER_ACTION_SET)
    }

    pub fn set_subfolder_action_set(&mut self, action_set: impl Into<String>) {
        self.subfolder_action_set = Some(Some(action_set.into()));
    }
}
