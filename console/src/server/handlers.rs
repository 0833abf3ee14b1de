//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use fleet_models::StationConfig;
use serde::{Deserialize, Serialize};

use crate::assets::uploader::{ActionScope, TemplateKind, UploadReceipt};
use crate::blob::BlobError;
use crate::errors::ConsoleError;
use crate::fleet::snapshot::FleetSnapshot;
use crate::reconcile::assignment::AssignmentMap;
use crate::reconcile::status::reconcile;
use crate::server::render;
use crate::server::state::ServerState;
use crate::server::views::{
    ActionsResponse, ConfigView, FleetResponse, MembershipView, StationDetail, StationSummary,
    StationsResponse,
};
use crate::stations::editor::{
    AssignmentUpdate, EditOutcome, ProfilesUpdate, SettingsUpdate, SubfolderUpdate,
};
use crate::utils::version_info;

/// Selector value meaning no server filter
pub const ALL_SERVERS: &str = "All Servers";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub backend: String,
}

/// Health check handler
pub async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "fleet-console".to_string(),
        version: version.version,
        backend: state.backend.clone(),
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    Json(version_info())
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerQuery {
    pub server: Option<String>,
}

impl ServerQuery {
    fn filter(&self) -> Option<&str> {
        self.server
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != ALL_SERVERS)
    }
}

/// Dashboard page
pub async fn dashboard_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ServerQuery>,
) -> Result<Html<String>, ConsoleError> {
    let snapshot = state.fleet.get_fleet_data().await;
    let stations = list_stations(&state, &snapshot, query.filter()).await?;
    let fleet = FleetResponse::from(&snapshot);

    Ok(Html(render::dashboard(&render::DashboardPage {
        fleet: &fleet,
        stations: &stations,
        backend: &state.backend,
        version: &version_info(),
    })))
}

/// Fleet snapshot and headline metrics
pub async fn fleet_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let snapshot = state.fleet.get_fleet_data().await;
    Json(FleetResponse::from(&snapshot))
}

/// Station list with status, optionally filtered by server
pub async fn stations_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ServerQuery>,
) -> Result<Json<StationsResponse>, ConsoleError> {
    let snapshot = state.fleet.get_fleet_data().await;
    Ok(Json(list_stations(&state, &snapshot, query.filter()).await?))
}

async fn list_stations(
    state: &ServerState,
    snapshot: &FleetSnapshot,
    server_filter: Option<&str>,
) -> Result<StationsResponse, ConsoleError> {
    let known = state.registry.station_ids().await?;
    let loaded = state.configs.load_many(&known).await;

    let assignments = AssignmentMap::build(
        loaded
            .iter()
            .filter_map(|(id, result)| result.as_ref().ok().map(|c| (id.as_str(), c))),
    );
    let selectable = assignments.selectable(&known, server_filter);

    let stations = loaded
        .iter()
        .filter(|(id, _)| selectable.contains(id))
        .map(|(id, result)| summarize(id, result, snapshot))
        .collect();

    Ok(StationsResponse {
        server_filter: server_filter.map(str::to_string),
        stations,
        assignments,
    })
}

fn summarize(
    station_id: &str,
    result: &Result<StationConfig, BlobError>,
    snapshot: &FleetSnapshot,
) -> StationSummary {
    match result {
        Ok(config) => {
            let status = reconcile(station_id, config, snapshot);
            StationSummary {
                station_id: station_id.to_string(),
                status: Some(status),
                status_label: status.label().to_string(),
                assigned_server: Some(config.assigned_server().to_string()),
                station_enabled: Some(config.is_enabled()),
                error: None,
            }
        }
        Err(e) => StationSummary {
            station_id: station_id.to_string(),
            status: None,
            status_label: if e.is_not_found() {
                "Config missing".to_string()
            } else {
                "Config unreadable".to_string()
            },
            assigned_server: None,
            station_enabled: None,
            error: Some(e.to_string()),
        },
    }
}

/// One station's config, status and assignment options
pub async fn station_handler(
    State(state): State<Arc<ServerState>>,
    Path(station_id): Path<String>,
) -> Result<Json<StationDetail>, ConsoleError> {
    state.registry.ensure_known(&station_id)?;

    let snapshot = state.fleet.get_fleet_data().await;
    let (config, path) = state.configs.load(&station_id).await?;
    let status = reconcile(&station_id, &config, &snapshot);
    let policy = state.editor.policy();

    Ok(Json(StationDetail {
        station_id: station_id.clone(),
        path,
        status,
        status_label: status.label().to_string(),
        assignment_options: policy
            .assignment_options(config.assigned_server(), &snapshot.online_server_ids()),
        reassignment_policy: policy.to_string(),
        memberships: snapshot
            .memberships(&station_id)
            .into_iter()
            .map(|(server_id, membership)| MembershipView {
                server_id,
                membership,
            })
            .collect(),
        config: ConfigView::from(&config),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct InitQuery {
    pub force: Option<bool>,
}

/// Create the default config document for a station
pub async fn init_handler(
    State(state): State<Arc<ServerState>>,
    Path(station_id): Path<String>,
    Query(query): Query<InitQuery>,
) -> Result<impl IntoResponse, ConsoleError> {
    state.registry.ensure_known(&station_id)?;

    let config = state
        .configs
        .initialize(&station_id, query.force.unwrap_or(false))
        .await?;
    Ok((StatusCode::CREATED, Json(ConfigView::from(&config))))
}

/// Edit response
#[derive(Debug, Serialize)]
pub struct EditResponse {
    #[serde(flatten)]
    pub outcome: EditOutcome,
    pub config: ConfigView,
}

impl From<EditOutcome> for EditResponse {
    fn from(outcome: EditOutcome) -> Self {
        let config = ConfigView::from(&outcome.config);
        Self { outcome, config }
    }
}

/// Enable switch and server assignment
pub async fn assignment_handler(
    State(state): State<Arc<ServerState>>,
    Path(station_id): Path<String>,
    Json(update): Json<AssignmentUpdate>,
) -> Result<Json<EditResponse>, ConsoleError> {
    state.registry.ensure_known(&station_id)?;

    let online = state.fleet.get_fleet_data().await.online_server_ids();
    let outcome = state
        .editor
        .update_assignment(&station_id, &update, &online)
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn settings_handler(
    State(state): State<Arc<ServerState>>,
    Path(station_id): Path<String>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<EditResponse>, ConsoleError> {
    state.registry.ensure_known(&station_id)?;
    let outcome = state.editor.update_settings(&station_id, &update).await?;
    Ok(Json(outcome.into()))
}

pub async fn profiles_handler(
    State(state): State<Arc<ServerState>>,
    Path(station_id): Path<String>,
    Json(update): Json<ProfilesUpdate>,
) -> Result<Json<EditResponse>, ConsoleError> {
    state.registry.ensure_known(&station_id)?;
    let outcome = state.editor.update_profiles(&station_id, &update).await?;
    Ok(Json(outcome.into()))
}

pub async fn subfolder_handler(
    State(state): State<Arc<ServerState>>,
    Path(station_id): Path<String>,
    Json(update): Json<SubfolderUpdate>,
) -> Result<Json<EditResponse>, ConsoleError> {
    state.registry.ensure_known(&station_id)?;
    let outcome = state.editor.update_subfolder(&station_id, &update).await?;
    Ok(Json(outcome.into()))
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    pub suffix: Option<String>,
}

/// Upload a background or overlay template; the body is the raw image
pub async fn template_handler(
    State(state): State<Arc<ServerState>>,
    Path((station_id, kind)): Path<(String, String)>,
    Query(query): Query<TemplateQuery>,
    body: Bytes,
) -> Result<Json<UploadReceipt>, ConsoleError> {
    state.registry.ensure_known(&station_id)?;
    let kind: TemplateKind = kind.parse()?;

    let receipt = state
        .uploader
        .upload_template(&station_id, kind, query.suffix.as_deref(), &body)
        .await?;
    Ok(Json(receipt))
}

#[derive(Debug, Default, Deserialize)]
pub struct ActionsQuery {
    pub station: Option<String>,
    pub trigger: Option<String>,
}

impl ActionsQuery {
    fn scope(&self, state: &ServerState) -> Result<ActionScope, ConsoleError> {
        let scope = ActionScope::from_station(self.station.as_deref());
        if let ActionScope::Station(station) = &scope {
            state.registry.ensure_known(station)?;
        }
        Ok(scope)
    }

    fn trigger(&self, state: &ServerState) -> Result<Option<&str>, ConsoleError> {
        let trigger = self
            .trigger
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(station) = trigger {
            state.registry.ensure_known(station)?;
        }
        Ok(trigger)
    }
}

/// Available actions, global or for one station
pub async fn actions_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ActionsQuery>,
) -> Result<Json<ActionsResponse>, ConsoleError> {
    let scope = query.scope(&state)?;
    let actions = state.uploader.list_actions(&scope).await?;
    Ok(Json(ActionsResponse {
        folder: state.uploader.folder(&scope),
        actions,
    }))
}

/// Upload an action file; the body is the raw `.atn` payload
pub async fn action_upload_handler(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    Query(query): Query<ActionsQuery>,
    body: Bytes,
) -> Result<Json<UploadReceipt>, ConsoleError> {
    let scope = query.scope(&state)?;
    let trigger = query.trigger(&state)?;

    let receipt = state
        .uploader
        .upload_action(&scope, &name, &body, trigger)
        .await?;
    Ok(Json(receipt))
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub path: String,
}

/// Write a trigger sentinel so the station's supervisor reloads
pub async fn trigger_handler(
    State(state): State<Arc<ServerState>>,
    Path(station_id): Path<String>,
) -> Result<impl IntoResponse, ConsoleError> {
    state.registry.ensure_known(&station_id)?;
    let path = state.uploader.trigger(&station_id).await?;
    Ok((StatusCode::CREATED, Json(TriggerResponse { path })))
}
