//! Trigger sentinel files
//!
//! The supervisor polls each station's intake folder. Dropping a tiny image
//! whose name starts with `_trigger_` there makes it reload the station's
//! config and actions. Nothing else reads these files.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::blob::{path, BlobError, BlobStore};
use crate::errors::ConsoleError;
use crate::storage::layout::StoreLayout;
use crate::utils::short_nonce;

/// Prefix the supervisor recognizes
pub const TRIGGER_PREFIX: &str = "_trigger_";

/// A 1x1 grayscale PNG
const TRIGGER_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Bytes written as the sentinel payload
pub fn trigger_png() -> Result<Vec<u8>, ConsoleError> {
    STANDARD
        .decode(TRIGGER_PNG_BASE64)
        .map_err(|e| ConsoleError::Internal(format!("Bad sentinel payload: {}", e)))
}

/// `_trigger_{YYYYMMDD_HHMMSS}_{nonce}.png`
pub fn sentinel_name(at: DateTime<Utc>, nonce: &str) -> String {
    format!(
        "{}{}_{}.png",
        TRIGGER_PREFIX,
        at.format("%Y%m%d_%H%M%S"),
        nonce
    )
}

/// Write a sentinel into the station's intake folder and return its path
pub async fn write_trigger(
    store: &dyn BlobStore,
    layout: &StoreLayout,
    station_id: &str,
) -> Result<String, BlobError> {
    let payload = trigger_png().map_err(|e| BlobError::Access(e.to_string()))?;
    let name = sentinel_name(Utc::now(), &short_nonce());
    let target = path::join(&layout.incoming_dir(station_id), &name);

    store.write_bytes(&target, &payload).await?;
    info!("Wrote trigger sentinel {}", target);
    Ok(target)
}
