//! Config repository tests

use std::time::Duration;

use fleet_console::blob::BlobError;
use fleet_console::errors::ConsoleError;
use fleet_console::stations::repository::ConfigRepository;
use fleet_console::storage::layout::StoreLayout;
use fleet_models::{OrientationMode, StationConfig, UNASSIGNED};
use serde_json::json;

use crate::support::MemoryStore;

fn repo(store: &MemoryStore) -> ConfigRepository {
    ConfigRepository::new(store.shared(), StoreLayout::default(), Duration::ZERO)
}

#[tokio::test]
async fn test_path_for() {
    let store = MemoryStore::new();
    assert_eq!(repo(&store).path_for("Dell XPS"), "/Dell XPS/config.json");
}

#[tokio::test]
async fn test_load_save_round_trip_preserves_document() {
    let store = MemoryStore::new();
    let original = json!({
        "station_id": "HP1",
        "station_enabled": false,
        "assigned_server": "S1",
        "settings": {
            "remove_background": true,
            "remove_bg_api_key": "rb-key",
            "temperature": -20,
            "orientation_mode": "force_landscape",
            "jpeg_quality": 92
        },
        "active_profile": {
            "portrait": {"action_set": "Photobooth_Actions", "action_name": "Warm"},
            "landscape": {"action_name": "Cool"}
        },
        "subfolder_action_set": "Weddings",
        "print_copies": 2,
        "notes": {"installed": "2024-11-02"}
    });
    store.put_json("/HP1/config.json", &original);

    let repo = repo(&store);
    let (config, path) = repo.load("HP1").await.unwrap();
    assert_eq!(path, "/HP1/config.json");
    repo.save("HP1", &config).await.unwrap();

    assert_eq!(store.get_json("/HP1/config.json"), original);
}

#[tokio::test]
async fn test_missing_and_malformed_are_distinct() {
    let store = MemoryStore::new();
    store.put("/HP2/config.json", "{ not json");
    let repo = repo(&store);

    assert_eq!(
        repo.load("HP1").await.unwrap_err(),
        BlobError::NotFound("/HP1/config.json".to_string())
    );
    assert!(matches!(
        repo.load("HP2").await.unwrap_err(),
        BlobError::Parse { .. }
    ));

    store.fail("/HP3");
    assert!(matches!(
        repo.load("HP3").await.unwrap_err(),
        BlobError::Access(_)
    ));
}

#[tokio::test]
async fn test_create_default_then_load() {
    let store = MemoryStore::new();
    let repo = repo(&store);

    repo.create_default("HP9").await.unwrap();
    let (config, _) = repo.load("HP9").await.unwrap();

    assert_eq!(config.station_id, "HP9");
    assert_eq!(config.station_enabled, Some(Some(true)));
    assert_eq!(config.assigned_server(), UNASSIGNED);
    let settings = config.settings();
    assert!(!settings.remove_background());
    assert!(!settings.has_api_key());
    assert_eq!(settings.temperature(), 0);
    assert_eq!(settings.orientation_mode(), OrientationMode::Auto);
    assert!(config.root_actions.is_some());
}

#[tokio::test]
async fn test_save_rejects_foreign_station_id() {
    let store = MemoryStore::new();
    let repo = repo(&store);

    let config = StationConfig::default_for("HP1");
    let result = repo.save("HP2", &config).await;
    assert!(matches!(result, Err(ConsoleError::ValidationError(_))));
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_initialize_refuses_existing_config() {
    let store = MemoryStore::new();
    store.put_config(&StationConfig::default_for("HP1"));
    let repo = repo(&store);

    let result = repo.initialize("HP1", false).await;
    assert!(matches!(result, Err(ConsoleError::Conflict(_))));
    let result = repo.initialize("HP1", true).await;
    assert!(matches!(result, Err(ConsoleError::Conflict(_))));
    assert!(store.writes().is_empty());

    let created = repo.initialize("HP2", false).await.unwrap();
    assert_eq!(created, StationConfig::default_for("HP2"));
    assert_eq!(store.writes(), vec!["/HP2/config.json"]);
}

#[tokio::test]
async fn test_initialize_replaces_malformed_only_with_force() {
    let store = MemoryStore::new();
    store.put("/HP1/config.json", "{");
    let repo = repo(&store);

    assert!(matches!(
        repo.initialize("HP1", false).await,
        Err(ConsoleError::Conflict(_))
    ));
    repo.initialize("HP1", true).await.unwrap();
    assert_eq!(repo.load("HP1").await.unwrap().0.station_id, "HP1");
}

#[tokio::test]
async fn test_initialize_propagates_access_errors() {
    let store = MemoryStore::new();
    store.fail("/HP1");
    let repo = repo(&store);

    assert!(matches!(
        repo.initialize("HP1", false).await,
        Err(ConsoleError::Blob(BlobError::Access(_)))
    ));
}

#[tokio::test]
async fn test_cache_serves_reads_until_save() {
    let store = MemoryStore::new();
    store.put_config(&StationConfig::default_for("HP1"));
    let repo = ConfigRepository::new(
        store.shared(),
        StoreLayout::default(),
        Duration::from_secs(60),
    );

    let (first, _) = repo.load("HP1").await.unwrap();

    // Out-of-band change is hidden by the cache
    let mut external = first.clone();
    external.set_subfolder_action_set("External");
    store.put_config(&external);
    assert_eq!(repo.load("HP1").await.unwrap().0, first);

    // Saving through the repository drops the cached copy
    let mut edited = first.clone();
    edited.set_enabled(false);
    repo.save("HP1", &edited).await.unwrap();
    assert_eq!(repo.load("HP1").await.unwrap().0, edited);
}

#[tokio::test]
async fn test_load_fresh_skips_cached_copy() {
    let store = MemoryStore::new();
    store.put_config(&StationConfig::default_for("HP1"));
    let repo = ConfigRepository::new(
        store.shared(),
        StoreLayout::default(),
        Duration::from_secs(60),
    );
    repo.load("HP1").await.unwrap();

    let mut external = StationConfig::default_for("HP1");
    external.set_assigned_server("S4");
    store.put_config(&external);

    let (fresh, _) = repo.load_fresh("HP1").await.unwrap();
    assert_eq!(fresh.assigned_server(), "S4");
    assert_eq!(repo.load("HP1").await.unwrap().0, external);
}

#[tokio::test]
async fn test_irregular_document_survives_round_trip() {
    let store = MemoryStore::new();
    let original = json!({
        "station_id": "HP1",
        "station_enabled": null,
        "assigned_server": null,
        "settings": {
            "temperature": "15",
            "orientation_mode": "Force_Portrait",
            "remove_background": null
        },
        "active_profile": {"portrait": null},
        "subfolder_action_set": null
    });
    store.put_json("/HP1/config.json", &original);
    let repo = repo(&store);

    let (config, _) = repo.load("HP1").await.unwrap();
    assert!(config.is_enabled());
    assert_eq!(config.settings().temperature(), 15);
    assert_eq!(config.settings().orientation_mode(), OrientationMode::ForcePortrait);

    repo.save("HP1", &config).await.unwrap();
    assert_eq!(store.get_json("/HP1/config.json"), original);

    // Floats and unknown modes are kept as written too
    let original = json!({"settings": {"temperature": 12.5, "orientation_mode": "sideways"}});
    store.put_json("/HP2/config.json", &original);
    let (config, _) = repo.load("HP2").await.unwrap();
    repo.save("HP2", &config).await.unwrap();
    assert_eq!(store.get_json("/HP2/config.json"), original);
}

#[tokio::test]
async fn test_load_many_keeps_order() {
    let store = MemoryStore::new();
    store.put_config(&StationConfig::default_for("HP1"));
    store.put_config(&StationConfig::default_for("HP3"));
    let repo = repo(&store);

    let ids = vec!["HP3".to_string(), "HP2".to_string(), "HP1".to_string()];
    let loaded = repo.load_many(&ids).await;

    let order: Vec<&str> = loaded.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(order, vec!["HP3", "HP2", "HP1"]);
    assert!(loaded[0].1.is_ok());
    assert!(loaded[1].1.as_ref().unwrap_err().is_not_found());
}
