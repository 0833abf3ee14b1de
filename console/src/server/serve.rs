//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::ConsoleError;
use crate::server::handlers::{
    action_upload_handler, actions_handler, assignment_handler, dashboard_handler,
    fleet_handler, health_handler, init_handler, profiles_handler, settings_handler,
    station_handler, stations_handler, subfolder_handler, template_handler, trigger_handler,
    version_handler,
};
use crate::server::state::ServerState;

/// Build the console router
pub fn router(state: Arc<ServerState>, max_upload_bytes: usize) -> Router {
    Router::new()
        // Dashboard
        .route("/", get(dashboard_handler))
        // Health and version
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        // Fleet
        .route("/api/fleet", get(fleet_handler))
        // Stations
        .route("/api/stations", get(stations_handler))
        .route("/api/stations/{id}", get(station_handler))
        .route("/api/stations/{id}/init", post(init_handler))
        .route("/api/stations/{id}/assignment", put(assignment_handler))
        .route("/api/stations/{id}/settings", put(settings_handler))
        .route("/api/stations/{id}/profiles", put(profiles_handler))
        .route("/api/stations/{id}/subfolder", put(subfolder_handler))
        .route("/api/stations/{id}/templates/{kind}", post(template_handler))
        .route("/api/stations/{id}/trigger", post(trigger_handler))
        // Actions
        .route("/api/actions", get(actions_handler))
        .route("/api/actions/{name}", post(action_upload_handler))
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), ConsoleError>>, ConsoleError> {
    let app = router(state, options.max_upload_bytes);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting HTTP server on http://{}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ConsoleError::ServerError(format!("bind {}: {}", addr, e)))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ConsoleError::ServerError(e.to_string()))
    });

    Ok(handle)
}
