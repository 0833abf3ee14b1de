//! Photobooth Fleet Console - Entry Point
//!
//! Operator console for the photobooth fleet. Reads server heartbeats and
//! edits station configs kept in shared cloud storage.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use colored::Colorize;
use fleet_console::app::options::AppOptions;
use fleet_console::app::run::run;
use fleet_console::authn::credentials::Credentials;
use fleet_console::authn::token_mngr::TokenManager;
use fleet_console::blob::dropbox::DropboxStore;
use fleet_console::blob::local::LocalStore;
use fleet_console::blob::BlobStore;
use fleet_console::filesys::file::File;
use fleet_console::http::client::HttpClient;
use fleet_console::logs::{init_logging, LogLevel, LogOptions};
use fleet_console::storage::settings::{BackendKind, Settings, DEFAULT_SETTINGS_FILE};
use fleet_console::utils::version_info;

use tracing::{error, info};

const USAGE: &str = "\
Usage: fleet-console [--config=PATH] [--port=PORT] [--log-level=LEVEL]
       fleet-console --version";

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        } else {
            fatal(&format!("Unexpected argument: {}\n{}", arg, USAGE));
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", version.version),
        }
        return;
    }
    if cli_args.contains_key("help") {
        println!("{}", USAGE);
        return;
    }

    // Retrieve the settings file
    let settings_path = cli_args
        .get("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let mut settings = match Settings::load(&File::new(&settings_path)).await {
        Ok(settings) => settings,
        Err(e) => fatal(&format!(
            "Unable to read settings file {}: {}",
            settings_path.display(),
            e
        )),
    };
    if let Err(e) = apply_overrides(&mut settings, &cli_args) {
        fatal(&format!("{:#}", e));
    }
    if let Err(e) = settings.validate() {
        fatal(&e.to_string());
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        json_format: settings.log_json,
        log_dir: settings.log_dir.as_ref().map(PathBuf::from),
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    // Connect to storage
    info!("Starting fleet console {} ({})", version.version, version.git_hash);
    let store = match connect_store(&settings).await {
        Ok(store) => store,
        Err(e) => {
            error!("Storage connection failed: {:#}", e);
            fatal(&format!("Storage connection failed: {:#}", e));
        }
    };

    // Run the server
    let options = AppOptions::from(&settings);
    info!("Running fleet console with options: {:?}", options);
    if let Err(e) = run(store, options, await_shutdown_signal()).await {
        error!("Failed to run the console: {e}");
        fatal(&e.to_string());
    }
}

/// `--port` and `--log-level` take precedence over the settings file
fn apply_overrides(
    settings: &mut Settings,
    cli_args: &HashMap<String, String>,
) -> anyhow::Result<()> {
    if let Some(port) = cli_args.get("port") {
        settings.server.port = port
            .parse()
            .with_context(|| format!("Invalid --port value: {}", port))?;
    }
    if let Some(level) = cli_args.get("log-level") {
        settings.log_level = level.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    Ok(())
}

/// Build the configured store and check it is reachable
async fn connect_store(settings: &Settings) -> anyhow::Result<Arc<dyn BlobStore>> {
    match settings.backend.kind {
        BackendKind::Local => {
            let store = LocalStore::new(&settings.backend.local_root);
            if !store.root().exists().await {
                bail!(
                    "Local store root {} does not exist",
                    store.root().path().display()
                );
            }
            info!("Using {}", store.describe());
            Ok(Arc::new(store))
        }
        BackendKind::Dropbox => {
            let credentials = Credentials::from_env()?;
            info!(
                "Connecting to Dropbox with {} credentials",
                if credentials.is_static() { "static token" } else { "refresh-token" }
            );
            let http_client = Arc::new(HttpClient::new(
                settings.backend.endpoints(),
                Duration::from_secs(settings.backend.request_timeout_secs),
            )?);
            let token_mngr = Arc::new(TokenManager::new(credentials, http_client.clone()));
            let store = DropboxStore::new(http_client, token_mngr);

            store
                .verify()
                .await
                .context("Unable to list the storage root")?;
            info!("Connected to {}", store.describe());
            Ok(Arc::new(store))
        }
    }
}

/// Print an operator-facing error and exit
fn fatal(message: &str) -> ! {
    eprintln!("{} {}", "error:".red().bold(), message);
    std::process::exit(1);
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("SIGTERM received, shutting down...");
                    }
                    _ = sigint.recv() => {
                        info!("SIGINT received, shutting down...");
                    }
                }
            }
            _ => {
                error!("Unable to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Ctrl+C received, shutting down...");
    }
}
