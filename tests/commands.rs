mod common;

use bmm_client_lib::commands::mods::GetInstalledMods;
use bmm_client_lib::commands::setup::{CheckCustomBalatro, CustomPath, FindSteamBalatro};
use bmm_client_lib::commands::{invoke_typed, invoke_with_timeout, NoArgs};
use bmm_client_lib::core::messages::MessageQueue;
use bmm_client_lib::core::mod_cache::InstalledModsCache;
use bmm_client_lib::core::reindex::perform_reindex;
use bmm_client_lib::models::error::SError;
use bmm_client_lib::models::message::Severity;
use common::MockBackend;
use serde_json::{json, Value};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn slow_command_times_out_with_command_name() {
    let backend = MockBackend::new();
    backend.respond("find_steam_balatro", json!(["/steam/Balatro"]));
    backend.set_delay(Duration::from_secs(10));

    let result = invoke_with_timeout::<FindSteamBalatro>(
        backend.as_ref(),
        &NoArgs {},
        Duration::from_secs(5),
    )
    .await;

    assert_eq!(
        result,
        Err(SError::Timeout("invoke-timeout:find_steam_balatro".into()))
    );
}

#[tokio::test(start_paused = true)]
async fn command_answering_in_time_is_decoded() {
    let backend = MockBackend::new();
    backend.respond("check_custom_balatro", json!(true));
    backend.set_delay(Duration::from_secs(1));

    let found = invoke_with_timeout::<CheckCustomBalatro>(
        backend.as_ref(),
        &CustomPath {
            path: "/games/Balatro".into(),
        },
        Duration::from_secs(5),
    )
    .await;

    assert_eq!(found, Ok(true));
}

#[tokio::test]
async fn malformed_result_is_a_parse_error() {
    let backend = MockBackend::new();
    backend.respond("get_installed_mods_from_db", json!({"name": "not a list"}));

    let result = invoke_typed::<GetInstalledMods>(backend.as_ref(), &NoArgs {}).await;

    assert!(matches!(result, Err(SError::ParseError(_))));
}

#[tokio::test]
async fn backend_error_passes_through() {
    let backend = MockBackend::new();
    backend.fail("find_steam_balatro", "steam not found");

    let result = invoke_typed::<FindSteamBalatro>(backend.as_ref(), &NoArgs {}).await;

    assert_eq!(result, Err(SError::Backend("steam not found".into())));
}

#[tokio::test]
async fn reindex_reports_success_and_refreshes_installed_mods() {
    let backend = MockBackend::new();
    backend.respond("refresh_mods_folder", Value::Null);
    backend.set_installed(&["Steamodded"]);
    let messages = MessageQueue::new(Duration::from_secs(3));
    let cache = InstalledModsCache::new(backend.clone(), Duration::from_secs(15));
    cache.fetch(false).await;

    assert!(perform_reindex(backend.as_ref(), &messages, &cache).await);

    let shown = messages.current();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].text, "Successfully re-indexed mods!");
    assert_eq!(shown[0].severity, Severity::Success);
    assert_eq!(backend.calls("get_installed_mods_from_db"), 2);
}

#[tokio::test]
async fn reindex_failure_is_reported() {
    let backend = MockBackend::new();
    backend.fail("refresh_mods_folder", "mods folder missing");
    let messages = MessageQueue::new(Duration::from_secs(3));
    let cache = InstalledModsCache::new(backend.clone(), Duration::from_secs(15));

    assert!(!perform_reindex(backend.as_ref(), &messages, &cache).await);

    let shown = messages.current();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].severity, Severity::Error);
    assert!(shown[0].text.starts_with("Failed to re-index mods: "));
    assert!(shown[0].text.contains("mods folder missing"));
    assert_eq!(backend.calls("get_installed_mods_from_db"), 0);
}
