//! Station registry discovery tests

use fleet_console::stations::registry::StationRegistry;
use fleet_console::storage::layout::StoreLayout;
use fleet_console::storage::settings::{Discovery, RegistrySettings};
use fleet_models::StationConfig;

use crate::support::MemoryStore;

#[tokio::test]
async fn test_probe_finds_folders_with_config() {
    let store = MemoryStore::new();
    store.put_config(&StationConfig::default_for("HP2"));
    store.put_config(&StationConfig::default_for("Dell XPS"));
    store.put("/HP5/templates/background.jpg", vec![0xFF, 0xD8, 0xFF]);
    store.put("/_Global_Assets/Actions/Warm.atn", "atn");
    store.put("/_Archive/config.json", "{}");
    store.put("/loose-file.txt", "x");

    let settings = RegistrySettings {
        discovery: Discovery::Probe,
        known: Vec::new(),
    };
    let registry = StationRegistry::from_settings(&settings, store.shared(), StoreLayout::default());

    assert_eq!(registry.station_ids().await.unwrap(), vec!["Dell XPS", "HP2"]);
    assert!(registry.ensure_known("HP7").is_ok());
}

#[tokio::test]
async fn test_probe_fails_when_root_unreadable() {
    let store = MemoryStore::new();
    store.fail("/");

    let settings = RegistrySettings {
        discovery: Discovery::Probe,
        known: Vec::new(),
    };
    let registry = StationRegistry::from_settings(&settings, store.shared(), StoreLayout::default());
    assert!(registry.station_ids().await.is_err());
}

#[tokio::test]
async fn test_static_registry_ignores_store() {
    let store = MemoryStore::new();
    store.fail("/");

    let settings = RegistrySettings {
        discovery: Discovery::Static,
        known: vec!["HP1".into()],
    };
    let registry = StationRegistry::from_settings(&settings, store.shared(), StoreLayout::default());
    assert_eq!(registry.station_ids().await.unwrap(), vec!["HP1"]);
}

#[test]
fn test_contains_on_default_fleet() {
    let store = MemoryStore::new();
    let registry = StationRegistry::from_settings(
        &RegistrySettings::default(),
        store.shared(),
        StoreLayout::default(),
    );

    let ids = tokio_test::assert_ok!(tokio_test::block_on(registry.station_ids()));
    assert_eq!(ids.len(), 23);
    assert!(tokio_test::block_on(registry.contains("HP1")).unwrap());
    assert!(!tokio_test::block_on(registry.contains("HP99")).unwrap());
    assert!(registry.ensure_known("HP99").is_err());
}
