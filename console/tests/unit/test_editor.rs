//! Station editor tests

use std::sync::Arc;
use std::time::Duration;

use fleet_console::errors::ConsoleError;
use fleet_console::reconcile::policy::ReassignmentPolicy;
use fleet_console::stations::editor::{
    ActionRefUpdate, AssignmentUpdate, ProfilesUpdate, SettingsUpdate, StationEditor,
    SubfolderUpdate,
};
use fleet_console::stations::repository::ConfigRepository;
use fleet_console::storage::layout::StoreLayout;
use fleet_models::{OrientationMode, StationConfig, UNASSIGNED};
use serde_json::json;

use crate::support::{assigned, MemoryStore};

fn editor(store: &MemoryStore, policy: ReassignmentPolicy) -> StationEditor {
    let repo = ConfigRepository::new(store.shared(), StoreLayout::default(), Duration::ZERO);
    StationEditor::new(Arc::new(repo), policy)
}

fn online() -> Vec<String> {
    vec!["S1".to_string(), "S2".to_string()]
}

fn assign(server: &str) -> AssignmentUpdate {
    AssignmentUpdate {
        station_enabled: None,
        assigned_server: Some(server.to_string()),
    }
}

#[tokio::test]
async fn test_free_policy_moves_between_online_servers() {
    let store = MemoryStore::new();
    store.put_config(&assigned("HP1", "S1"));
    let editor = editor(&store, ReassignmentPolicy::Free);

    let outcome = editor
        .update_assignment("HP1", &assign("S2"), &online())
        .await
        .unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.config.assigned_server(), "S2");
    assert_eq!(store.writes(), vec!["/HP1/config.json"]);
    assert_eq!(store.get_json("/HP1/config.json")["assigned_server"], "S2");
}

#[tokio::test]
async fn test_free_policy_rejects_offline_target() {
    let store = MemoryStore::new();
    store.put_config(&assigned("HP1", "S1"));
    let editor = editor(&store, ReassignmentPolicy::Free);

    let result = editor
        .update_assignment("HP1", &assign("S9"), &online())
        .await;
    assert!(matches!(result, Err(ConsoleError::ValidationError(_))));
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_strict_policy_requires_release_first() {
    let store = MemoryStore::new();
    store.put_config(&assigned("HP1", "S1"));
    let editor = editor(&store, ReassignmentPolicy::StrictOneHop);

    let result = editor
        .update_assignment("HP1", &assign("S2"), &online())
        .await;
    assert!(matches!(result, Err(ConsoleError::ValidationError(_))));
    assert!(store.writes().is_empty());

    editor
        .update_assignment("HP1", &assign(UNASSIGNED), &online())
        .await
        .unwrap();
    let outcome = editor
        .update_assignment("HP1", &assign("S2"), &online())
        .await
        .unwrap();
    assert_eq!(outcome.config.assigned_server(), "S2");
    assert_eq!(store.writes().len(), 2);
}

#[tokio::test]
async fn test_unchanged_request_writes_nothing() {
    let store = MemoryStore::new();
    store.put_config(&assigned("HP1", "S9"));
    let editor = editor(&store, ReassignmentPolicy::StrictOneHop);

    // Keeping an offline server is allowed and not a change
    let update = AssignmentUpdate {
        station_enabled: Some(true),
        assigned_server: Some("S9".into()),
    };
    let outcome = editor
        .update_assignment("HP1", &update, &online())
        .await
        .unwrap();
    assert!(!outcome.changed);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_toggle_and_assign_in_one_save() {
    let store = MemoryStore::new();
    store.put_config(&StationConfig::default_for("HP1"));
    let editor = editor(&store, ReassignmentPolicy::Free);

    let update = AssignmentUpdate {
        station_enabled: Some(false),
        assigned_server: Some("S1".into()),
    };
    editor
        .update_assignment("HP1", &update, &online())
        .await
        .unwrap();

    assert_eq!(store.writes().len(), 1);
    let saved = store.get_json("/HP1/config.json");
    assert_eq!(saved["station_enabled"], false);
    assert_eq!(saved["assigned_server"], "S1");
}

#[tokio::test]
async fn test_missing_config_is_not_found() {
    let store = MemoryStore::new();
    let editor = editor(&store, ReassignmentPolicy::Free);

    let result = editor
        .update_assignment("HP1", &assign(UNASSIGNED), &online())
        .await;
    assert!(matches!(result, Err(ConsoleError::NotFound(_))));
}

#[tokio::test]
async fn test_update_settings() {
    let store = MemoryStore::new();
    store.put_json(
        "/HP1/config.json",
        &json!({"station_id": "HP1", "settings": {"jpeg_quality": 90}}),
    );
    let editor = editor(&store, ReassignmentPolicy::Free);

    let update = SettingsUpdate {
        remove_background: Some(true),
        remove_bg_api_key: Some(" rb-key ".into()),
        temperature: Some(-35),
        orientation_mode: Some("force_portrait".into()),
    };
    let outcome = editor.update_settings("HP1", &update).await.unwrap();
    assert!(outcome.changed);

    let settings = outcome.config.settings();
    assert!(settings.remove_background());
    assert_eq!(settings.api_key(), Some("rb-key"));
    assert_eq!(settings.temperature(), -35);
    assert_eq!(settings.orientation_mode(), OrientationMode::ForcePortrait);
    assert_eq!(store.get_json("/HP1/config.json")["settings"]["jpeg_quality"], 90);

    // Omitted key keeps the stored one
    let outcome = editor
        .update_settings(
            "HP1",
            &SettingsUpdate {
                temperature: Some(-35),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!outcome.changed);
    assert_eq!(store.writes().len(), 1);
}

#[tokio::test]
async fn test_settings_defaults_do_not_create_block() {
    let store = MemoryStore::new();
    store.put_json("/HP1/config.json", &json!({"station_id": "HP1"}));
    let editor = editor(&store, ReassignmentPolicy::Free);

    let update = SettingsUpdate {
        remove_background: Some(false),
        temperature: Some(0),
        orientation_mode: Some("auto".into()),
        ..Default::default()
    };
    let outcome = editor.update_settings("HP1", &update).await.unwrap();
    assert!(!outcome.changed);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_invalid_settings_rejected() {
    let store = MemoryStore::new();
    store.put_config(&StationConfig::default_for("HP1"));
    let editor = editor(&store, ReassignmentPolicy::Free);

    let too_hot = SettingsUpdate {
        temperature: Some(101),
        ..Default::default()
    };
    assert!(matches!(
        editor.update_settings("HP1", &too_hot).await,
        Err(ConsoleError::ValidationError(_))
    ));

    let sideways = SettingsUpdate {
        orientation_mode: Some("sideways".into()),
        ..Default::default()
    };
    assert!(matches!(
        editor.update_settings("HP1", &sideways).await,
        Err(ConsoleError::ValidationError(_))
    ));
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_profiles_keep_existing_key() {
    let store = MemoryStore::new();
    store.put_json(
        "/HP1/config.json",
        &json!({
            "station_id": "HP1",
            "active_profile": {"portrait": {"action_name": "Old"}}
        }),
    );
    let editor = editor(&store, ReassignmentPolicy::Free);

    let update = ProfilesUpdate {
        portrait: Some(ActionRefUpdate {
            action_set: None,
            action_name: "Warm".into(),
        }),
        landscape: Some(ActionRefUpdate {
            action_set: Some("Custom".into()),
            action_name: "Cool".into(),
        }),
    };
    editor.update_profiles("HP1", &update).await.unwrap();

    let saved = store.get_json("/HP1/config.json");
    assert!(saved.get("root_actions").is_none());
    assert_eq!(
        saved["active_profile"]["portrait"],
        json!({"action_set": "Photobooth_Actions", "action_name": "Warm"})
    );
    assert_eq!(saved["active_profile"]["landscape"]["action_set"], "Custom");

    // Same values again: no write
    let outcome = editor.update_profiles("HP1", &update).await.unwrap();
    assert!(!outcome.changed);
    assert_eq!(store.writes().len(), 1);
}

#[tokio::test]
async fn test_profiles_on_bare_document_use_root_actions() {
    let store = MemoryStore::new();
    store.put_json("/HP1/config.json", &json!({"station_id": "HP1"}));
    let editor = editor(&store, ReassignmentPolicy::Free);

    let update = ProfilesUpdate {
        portrait: Some(ActionRefUpdate {
            action_set: None,
            action_name: "Warm".into(),
        }),
        landscape: None,
    };
    editor.update_profiles("HP1", &update).await.unwrap();

    let saved = store.get_json("/HP1/config.json");
    assert_eq!(saved["root_actions"]["portrait"]["action_name"], "Warm");
    assert!(saved.get("active_profile").is_none());
}

#[tokio::test]
async fn test_update_subfolder() {
    let store = MemoryStore::new();
    store.put_config(&StationConfig::default_for("HP1"));
    let editor = editor(&store, ReassignmentPolicy::Free);

    let outcome = editor
        .update_subfolder(
            "HP1",
            &SubfolderUpdate {
                subfolder_action_set: "Event_Subfolders".into(),
            },
        )
        .await
        .unwrap();
    assert!(!outcome.changed);

    editor
        .update_subfolder(
            "HP1",
            &SubfolderUpdate {
                subfolder_action_set: "Weddings".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        store.get_json("/HP1/config.json")["subfolder_action_set"],
        "Weddings"
    );

    let blank = SubfolderUpdate {
        subfolder_action_set: "  ".into(),
    };
    assert!(editor.update_subfolder("HP1", &blank).await.is_err());
}

#[tokio::test]
async fn test_edit_reads_past_the_cache() {
    let store = MemoryStore::new();
    store.put_config(&StationConfig::default_for("HP1"));
    let repo = Arc::new(ConfigRepository::new(
        store.shared(),
        StoreLayout::default(),
        Duration::from_secs(60),
    ));
    let editor = StationEditor::new(repo.clone(), ReassignmentPolicy::Free);

    // Cache holds the enabled copy while another writer disables the station
    repo.load("HP1").await.unwrap();
    let mut external = StationConfig::default_for("HP1");
    external.set_enabled(false);
    store.put_config(&external);

    let update = SubfolderUpdate {
        subfolder_action_set: "Weddings".into(),
    };
    let outcome = editor.update_subfolder("HP1", &update).await.unwrap();
    assert!(outcome.changed);

    let saved = store.get_json("/HP1/config.json");
    assert_eq!(saved["station_enabled"], false);
    assert_eq!(saved["subfolder_action_set"], "Weddings");
}

#[tokio::test]
async fn test_unchanged_edit_keeps_stored_spelling() {
    let store = MemoryStore::new();
    let raw = json!({
        "station_id": "HP1",
        "station_enabled": null,
        "settings": {"temperature": "15", "orientation_mode": "Force_Portrait"}
    });
    store.put_json("/HP1/config.json", &raw);
    let editor = editor(&store, ReassignmentPolicy::Free);

    let update = SettingsUpdate {
        temperature: Some(15),
        orientation_mode: Some("force_portrait".into()),
        ..Default::default()
    };
    let outcome = editor.update_settings("HP1", &update).await.unwrap();
    assert!(!outcome.changed);
    assert!(store.writes().is_empty());

    let update = SettingsUpdate {
        temperature: Some(20),
        ..Default::default()
    };
    editor.update_settings("HP1", &update).await.unwrap();
    assert_eq!(
        store.get_json("/HP1/config.json"),
        json!({
            "station_id": "HP1",
            "station_enabled": null,
            "settings": {"temperature": 20, "orientation_mode": "Force_Portrait"}
        })
    );
}
