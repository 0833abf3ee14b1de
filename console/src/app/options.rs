//! Application configuration options

use std::time::Duration;

use crate::reconcile::policy::ReassignmentPolicy;
use crate::storage::layout::StoreLayout;
use crate::storage::settings::{RegistrySettings, Settings};

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Remote storage layout
    pub layout: StoreLayout,

    /// Station registry configuration
    pub registry: RegistrySettings,

    /// Which assignment changes are allowed
    pub reassignment_policy: ReassignmentPolicy,

    /// Config read cache lifetime; zero disables the cache
    pub cache_ttl: Duration,

    /// Server configuration
    pub server: ServerOptions,

    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for AppOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            layout: StoreLayout::new(settings.global_assets_dir.as_str()),
            registry: settings.stations.clone(),
            reassignment_policy: settings.reassignment_policy,
            cache_ttl: Duration::from_secs(settings.cache_ttl_secs),
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
                max_upload_bytes: settings.max_upload_mb.saturating_mul(1024 * 1024),
            },
            max_shutdown_delay: Duration::from_secs(10),
        }
    }
}

/// Console HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Largest accepted request body
    pub max_upload_bytes: usize,
}
