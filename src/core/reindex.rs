use crate::commands::mods::RefreshModsFolder;
use crate::commands::{invoke_typed, NoArgs};
use crate::core::backend::Backend;
use crate::core::messages::MessageQueue;
use crate::core::mod_cache::InstalledModsCache;
use crate::models::message::Severity;
use tracing::{error, info, instrument};

/// Asks the backend to re-scan the mods folder and reports the outcome as a toast.
#[instrument(skip_all)]
pub async fn perform_reindex(
    backend: &dyn Backend,
    messages: &MessageQueue,
    cache: &InstalledModsCache,
) -> bool {
    match invoke_typed::<RefreshModsFolder>(backend, &NoArgs {}).await {
        Ok(()) => {
            info!("mods folder re-indexed");
            messages.push("Successfully re-indexed mods!", Severity::Success);
            cache.force_refresh().await;
            true
        }
        Err(e) => {
            error!("Failed to re-index mods: {e}");
            messages.push(format!("Failed to re-index mods: {e}"), Severity::Error);
            false
        }
    }
}
