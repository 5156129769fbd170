use crate::config::ClientConfig;
use crate::core::backend::Backend;
use crate::core::catalog::CatalogStore;
use crate::core::events::BackendEvents;
use crate::core::image_cache::{HttpImageFetcher, ImageCache, ImageFetcher};
use crate::core::listener::{ListenerGuard, ListenerRegistry};
use crate::core::messages::MessageQueue;
use crate::core::mod_cache::InstalledModsCache;
use crate::core::reindex;
use crate::core::storage::{JsonFileStorage, KeyValueStorage};
use crate::core::ui_prefs::UiPreferences;
use crate::core::version::CachedVersions;
use crate::models::error::SError;
use crate::utils::logging::init_logging;
use std::sync::Arc;
use tracing::{info, warn};

/// Every client-side store, wired to one backend and one storage.
pub struct AppRegistry {
    pub config: ClientConfig,
    pub backend: Arc<dyn Backend>,
    pub events: Arc<dyn BackendEvents>,
    pub storage: Arc<dyn KeyValueStorage>,
    pub messages: MessageQueue,
    pub installed_mods: InstalledModsCache,
    pub catalog: CatalogStore,
    pub versions: CachedVersions,
    pub images: ImageCache,
    pub ui: UiPreferences,
}

impl AppRegistry {
    pub fn new(
        config: ClientConfig,
        backend: Arc<dyn Backend>,
        events: Arc<dyn BackendEvents>,
        storage: Arc<dyn KeyValueStorage>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        let messages = MessageQueue::new(config.message_expiry());
        let installed_mods = InstalledModsCache::new(backend.clone(), config.installed_mods_ttl());
        let catalog = CatalogStore::new(storage.clone(), backend.clone(), messages.clone());
        let versions = CachedVersions::new(storage.clone(), backend.clone());
        let images = ImageCache::new(&config.image_cache_dir, fetcher);
        let ui = UiPreferences::load(storage.clone());

        Self {
            config,
            backend,
            events,
            storage,
            messages,
            installed_mods,
            catalog,
            versions,
            images,
            ui,
        }
    }

    /// Builds the registry with file-backed storage and HTTP image downloads, as configured.
    /// Also installs file logging under `config.log_dir`.
    pub fn from_config(
        config: ClientConfig,
        backend: Arc<dyn Backend>,
        events: Arc<dyn BackendEvents>,
    ) -> Self {
        init_logging(&config.log_dir);
        let storage = Arc::new(JsonFileStorage::open(&config.storage_file));
        let fetcher = Arc::new(HttpImageFetcher::new());
        Self::new(config, backend, events, storage, fetcher)
    }

    /// Startup wiring: attaches the installed-mods change listener through the
    /// process-wide registry. Call once from the host's init sequence and keep the guard.
    pub fn start(&self) -> Result<Option<ListenerGuard>, SError> {
        self.start_with(ListenerRegistry::global())
    }

    pub fn start_with(
        &self,
        listeners: &ListenerRegistry,
    ) -> Result<Option<ListenerGuard>, SError> {
        info!("starting client state");
        listeners.install_installed_mods_listener(&self.installed_mods, self.events.as_ref())
    }

    pub async fn reindex_mods(&self) -> bool {
        reindex::perform_reindex(self.backend.as_ref(), &self.messages, &self.installed_mods).await
    }

    /// Refreshes the catalog, then flags the entries that are installed.
    ///
    /// If the installed list cannot be fetched, the last successfully fetched
    /// list is used; with none, the flags are left as the catalog reported them.
    pub async fn refresh_catalog(&self) -> bool {
        let ok = self.catalog.refresh().await;
        if ok {
            match self.installed_mods.try_fetch(false).await {
                Ok(installed) => self.catalog.sync_installed(&installed),
                Err(e) if self.installed_mods.last_fetch().is_some() => {
                    warn!("Flagging installed mods from the cached list: {e}");
                    self.catalog.sync_installed(&self.installed_mods.cached());
                }
                Err(e) => warn!("Installed mods unknown, leaving catalog flags as fetched: {e}"),
            }
        }
        ok
    }
}
