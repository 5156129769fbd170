mod common;

use bmm_client_lib::core::catalog::MODS_CACHE_KEY;
use bmm_client_lib::core::events::{ChannelEvents, INSTALLED_MODS_CHANGED};
use bmm_client_lib::core::storage::{KeyValueStorage, MemoryStorage};
use bmm_client_lib::core::ui_prefs::CARD_SCALE_KEY;
use bmm_client_lib::{AppRegistry, ClientConfig};
use common::{temp_root, MockBackend, MockFetcher};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn registry_with(
    backend: Arc<MockBackend>,
    events: Arc<ChannelEvents>,
    storage: Arc<dyn KeyValueStorage>,
) -> (tempfile::TempDir, AppRegistry) {
    let (tmp, root) = temp_root();
    let config = ClientConfig {
        storage_file: root.join("local-storage.json"),
        image_cache_dir: root.join("cache"),
        log_dir: root.join("logs"),
        ..ClientConfig::default()
    };
    let registry = AppRegistry::new(config, backend, events, storage, MockFetcher::new());
    (tmp, registry)
}

#[tokio::test]
async fn startup_attaches_the_listener_once_per_process() {
    let backend = MockBackend::new();
    let events = Arc::new(ChannelEvents::new());
    let (_tmp, app) = registry_with(backend, events.clone(), Arc::new(MemoryStorage::new()));

    let guard = app.start().unwrap();
    assert!(guard.is_some());
    assert!(app.start().unwrap().is_none());
    assert_eq!(events.emit(INSTALLED_MODS_CHANGED, Value::Null), 1);
}

fn catalog_entry(title: &str, categories: &[u8]) -> Value {
    json!({
        "title": title,
        "description": "",
        "image": "",
        "categories": categories,
        "colors": {"color1": "#fff", "color2": "#000"},
        "installed": false,
        "requires_steamodded": true,
        "requires_talisman": false,
        "publisher": "MathIsFun",
        "repo": format!("https://github.com/MathIsFun0/{title}"),
        "downloadURL": format!("https://github.com/MathIsFun0/{title}/archive/main.zip"),
        "lastUpdated": 0
    })
}

fn respond_catalog(backend: &MockBackend) {
    backend.respond(
        "get_mod_catalog",
        json!([catalog_entry("Cryptid", &[0, 1]), catalog_entry("Talisman", &[6])]),
    );
}

fn installed_titles(app: &AppRegistry) -> Vec<String> {
    app.catalog
        .mods()
        .into_iter()
        .filter(|m| m.installed)
        .map(|m| m.title)
        .collect()
}

#[tokio::test]
async fn refreshed_catalog_marks_installed_mods() {
    let backend = MockBackend::new();
    backend.set_installed(&["Cryptid"]);
    respond_catalog(&backend);
    let (_tmp, app) = registry_with(
        backend,
        Arc::new(ChannelEvents::new()),
        Arc::new(MemoryStorage::new()),
    );

    assert!(app.refresh_catalog().await);
    assert_eq!(installed_titles(&app), vec!["Cryptid"]);
}

#[tokio::test(start_paused = true)]
async fn installed_flags_survive_an_installed_mods_outage() {
    let backend = MockBackend::new();
    backend.set_installed(&["Cryptid"]);
    respond_catalog(&backend);
    let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
    let events = Arc::new(ChannelEvents::new());
    let (_tmp, app) = registry_with(backend.clone(), events, storage.clone());

    assert!(app.refresh_catalog().await);
    assert_eq!(installed_titles(&app), vec!["Cryptid"]);

    backend.fail("get_installed_mods_from_db", "database is locked");
    tokio::time::advance(Duration::from_secs(16)).await;

    assert!(app.refresh_catalog().await);
    assert_eq!(backend.calls("get_installed_mods_from_db"), 2);
    assert_eq!(installed_titles(&app), vec!["Cryptid"]);

    let snapshot = storage.get_item(MODS_CACHE_KEY).unwrap().unwrap();
    let slim: Vec<Value> = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(slim[0]["title"], "Cryptid");
    assert_eq!(slim[0]["installed"], true);
}

#[tokio::test]
async fn unknown_installed_list_leaves_catalog_flags_alone() {
    let backend = MockBackend::new();
    backend.fail("get_installed_mods_from_db", "database is locked");
    respond_catalog(&backend);
    let (_tmp, app) = registry_with(
        backend,
        Arc::new(ChannelEvents::new()),
        Arc::new(MemoryStorage::new()),
    );

    assert!(app.refresh_catalog().await);
    assert!(installed_titles(&app).is_empty());
    assert_eq!(app.catalog.mods().len(), 2);
}

#[tokio::test]
async fn preferences_are_hydrated_from_shared_storage() {
    let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
    storage.set_item(CARD_SCALE_KEY, "3.5").unwrap();

    let (_tmp, app) = registry_with(
        MockBackend::new(),
        Arc::new(ChannelEvents::new()),
        storage.clone(),
    );

    assert_eq!(app.ui.card_scale.get(), 1.4);
    assert_eq!(app.ui.current_category.get(), "Popular");
    assert!(!app.ui.update_prompt_disabled.get());
    assert_eq!(storage.get_item(CARD_SCALE_KEY).unwrap().as_deref(), Some("1.4"));
}
