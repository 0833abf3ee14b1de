//! Fleet reader tests

use fleet_console::blob::BlobError;
use fleet_console::fleet::reader::FleetReader;
use fleet_console::storage::layout::StoreLayout;

use crate::support::{health, MemoryStore};

const HEALTH_DIR: &str = "/_Global_Assets/_Server_Health";

fn reader(store: &MemoryStore) -> FleetReader {
    FleetReader::new(store.shared(), StoreLayout::default())
}

#[tokio::test]
async fn test_reads_every_health_record() {
    let store = MemoryStore::new();
    store.put_health(&health("S2", &["HP3"]));
    store.put_health(&health("S1", &["HP1", "HP2"]));

    let snapshot = reader(&store).get_fleet_data().await;
    assert_eq!(snapshot.online_count(), 2);
    assert_eq!(snapshot.skipped, 0);
    assert!(snapshot.folder_error.is_none());
    assert_eq!(snapshot.online_server_ids(), vec!["S1", "S2"]);
    assert_eq!(snapshot.avg_disk_free_gb(), Some(50.0));
    assert!(snapshot.server("S1").unwrap().is_active("HP2"));
}

#[tokio::test]
async fn test_malformed_record_is_skipped() {
    let store = MemoryStore::new();
    store.put_health(&health("S1", &["HP1"]));
    store.put(&format!("{}/S2.json", HEALTH_DIR), "{\"server_id\": ");
    store.put(&format!("{}/README.txt", HEALTH_DIR), "not a record");
    store.put(&format!("{}/S3.JSON", HEALTH_DIR), "{\"server_id\": \"S3\"}");

    let snapshot = reader(&store).get_fleet_data().await;
    assert_eq!(snapshot.online_server_ids(), vec!["S1", "S3"]);
    assert_eq!(snapshot.skipped, 1);
}

#[tokio::test]
async fn test_unreadable_record_is_skipped() {
    let store = MemoryStore::new();
    store.put_health(&health("S1", &[]));
    store.put_health(&health("S2", &[]));
    store.fail(&format!("{}/S2.json", HEALTH_DIR));

    let snapshot = reader(&store).get_fleet_data().await;
    assert_eq!(snapshot.online_server_ids(), vec!["S1"]);
    assert_eq!(snapshot.skipped, 1);
}

#[tokio::test]
async fn test_unreadable_folder_yields_empty_snapshot() {
    let store = MemoryStore::new();
    store.put_health(&health("S1", &[]));
    store.fail(HEALTH_DIR);

    let snapshot = reader(&store).get_fleet_data().await;
    assert_eq!(snapshot.online_count(), 0);
    assert_eq!(snapshot.avg_disk_free_gb(), None);
    assert!(matches!(snapshot.folder_error, Some(BlobError::Access(_))));
}

#[tokio::test]
async fn test_missing_folder_yields_empty_snapshot() {
    let store = MemoryStore::new();
    let snapshot = reader(&store).get_fleet_data().await;
    assert_eq!(snapshot.online_count(), 0);
    assert!(snapshot.folder_error.unwrap().is_not_found());
}
