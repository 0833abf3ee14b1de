//! Template and action upload tests

use fleet_console::assets::uploader::{ActionScope, AssetUploader, TemplateKind};
use fleet_console::errors::ConsoleError;
use fleet_console::storage::layout::StoreLayout;
use fleet_console::utils::sha256_hash;

use crate::support::MemoryStore;

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

fn uploader(store: &MemoryStore) -> AssetUploader {
    AssetUploader::new(store.shared(), StoreLayout::default())
}

#[tokio::test]
async fn test_template_paths() {
    let store = MemoryStore::new();
    let uploader = uploader(&store);

    let receipt = uploader
        .upload_template("HP1", TemplateKind::Background, Some("007"), JPEG)
        .await
        .unwrap();
    assert_eq!(receipt.path, "/HP1/templates/background007.jpg");
    assert_eq!(receipt.bytes, JPEG.len());
    assert_eq!(receipt.sha256, sha256_hash(JPEG));

    let receipt = uploader
        .upload_template("HP1", TemplateKind::Background, None, JPEG)
        .await
        .unwrap();
    assert_eq!(receipt.path, "/HP1/templates/background.jpg");

    let receipt = uploader
        .upload_template("HP1", TemplateKind::Overlay, Some("007"), PNG)
        .await
        .unwrap();
    assert_eq!(receipt.path, "/HP1/templates/overlay007.png");
    assert_eq!(store.get("/HP1/templates/overlay007.png").unwrap(), PNG);
}

#[tokio::test]
async fn test_template_validation() {
    let store = MemoryStore::new();
    let uploader = uploader(&store);

    let bad_suffix = uploader
        .upload_template("HP1", TemplateKind::Background, Some("07"), JPEG)
        .await;
    assert!(matches!(bad_suffix, Err(ConsoleError::ValidationError(_))));

    let wrong_format = uploader
        .upload_template("HP1", TemplateKind::Overlay, None, JPEG)
        .await;
    assert!(matches!(wrong_format, Err(ConsoleError::ValidationError(_))));
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_action_upload_with_trigger() {
    let store = MemoryStore::new();
    let uploader = uploader(&store);

    let receipt = uploader
        .upload_action(&ActionScope::Global, "Vintage", b"8BAS-action", Some("HP1"))
        .await
        .unwrap();

    assert_eq!(receipt.path, "/_Global_Assets/Actions/Vintage.atn");
    assert!(receipt.trigger_error.is_none());

    let writes = store.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0], "/_Global_Assets/Actions/Vintage.atn");

    let trigger = receipt.trigger_path.unwrap();
    assert_eq!(writes[1], trigger);
    assert!(trigger.starts_with("/HP1/incoming/_trigger_"));
    assert!(trigger.ends_with(".png"));
    assert!(store.get(&trigger).unwrap().starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[tokio::test]
async fn test_failed_trigger_keeps_action() {
    let store = MemoryStore::new();
    store.fail("/HP1/incoming");
    let uploader = uploader(&store);

    let receipt = uploader
        .upload_action(
            &ActionScope::Station("HP1".into()),
            "Vintage.atn",
            b"8BAS-action",
            Some("HP1"),
        )
        .await
        .unwrap();

    assert_eq!(receipt.path, "/HP1/actions/Vintage.atn");
    assert!(receipt.trigger_path.is_none());
    assert!(receipt.trigger_error.is_some());
    assert!(store.get("/HP1/actions/Vintage.atn").is_some());
}

#[tokio::test]
async fn test_action_without_trigger_writes_once() {
    let store = MemoryStore::new();
    let uploader = uploader(&store);

    uploader
        .upload_action(&ActionScope::Global, "Vintage", b"x", None)
        .await
        .unwrap();
    assert_eq!(store.writes().len(), 1);

    let bad = uploader
        .upload_action(&ActionScope::Global, "a/b", b"x", None)
        .await;
    assert!(matches!(bad, Err(ConsoleError::ValidationError(_))));
}

#[tokio::test]
async fn test_list_actions() {
    let store = MemoryStore::new();
    store.put("/_Global_Assets/Actions/Warm.atn", "a");
    store.put("/_Global_Assets/Actions/Cool.ATN", "a");
    store.put("/_Global_Assets/Actions/notes.txt", "a");
    store.put("/_Global_Assets/Actions/old/Legacy.atn", "a");
    store.put("/HP1/actions/Local.atn", "a");
    let uploader = uploader(&store);

    assert_eq!(
        uploader.list_actions(&ActionScope::Global).await.unwrap(),
        vec!["Cool", "Warm"]
    );
    assert_eq!(
        uploader
            .list_actions(&ActionScope::Station("HP1".into()))
            .await
            .unwrap(),
        vec!["Local"]
    );
    assert!(uploader
        .list_actions(&ActionScope::Station("HP2".into()))
        .await
        .unwrap_err()
        .is_not_found());
}
