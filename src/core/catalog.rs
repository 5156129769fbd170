use crate::commands::catalog::GetModCatalog;
use crate::commands::{invoke_typed, NoArgs};
use crate::core::backend::Backend;
use crate::core::messages::MessageQueue;
use crate::core::observable::{Observable, Subscription};
use crate::core::storage::KeyValueStorage;
use crate::models::error::SError;
use crate::models::message::Severity;
use crate::models::mod_dto::{Category, InstalledMod, Mod, SlimMod};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, instrument, warn};

pub const MODS_CACHE_KEY: &str = "mods-cache";
pub const MODS_CACHE_TS_KEY: &str = "mods-cache-ts";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Title,
    /// Most recently updated first.
    LastUpdated,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Reads the persisted slim snapshot. Anything unreadable counts as no snapshot.
fn hydrate(storage: &dyn KeyValueStorage) -> (Vec<Mod>, Option<u64>) {
    let mods = match storage.get_item(MODS_CACHE_KEY) {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<SlimMod>>(&raw) {
            Ok(slim) => slim.into_iter().map(Mod::from).collect(),
            Err(e) => {
                warn!("Ignoring unreadable catalog snapshot: {e}");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("Failed to read catalog snapshot: {e}");
            Vec::new()
        }
    };

    let refreshed = storage
        .get_item(MODS_CACHE_TS_KEY)
        .ok()
        .flatten()
        .and_then(|raw| raw.trim().parse::<u64>().ok());

    (mods, refreshed)
}

fn write_snapshot(storage: &dyn KeyValueStorage, mods: &[Mod], at: u64) -> Result<(), SError> {
    let slim: Vec<SlimMod> = mods.iter().map(SlimMod::from).collect();
    let json = serde_json::to_string(&slim)?;
    storage.set_item(MODS_CACHE_KEY, &json)?;
    storage.set_item(MODS_CACHE_TS_KEY, &at.to_string())
}

/// Writes the slim snapshot, or removes it entirely if the write fails so the
/// next start never sees a partial one.
fn persist(storage: &dyn KeyValueStorage, mods: &[Mod], last_refreshed: &Observable<Option<u64>>) {
    let at = now_ms();
    match write_snapshot(storage, mods, at) {
        Ok(()) => {
            debug!("persisted catalog snapshot of {} mods", mods.len());
            last_refreshed.set(Some(at));
        }
        Err(e) => {
            warn!("Failed to persist catalog snapshot, clearing it: {e}");
            for key in [MODS_CACHE_KEY, MODS_CACHE_TS_KEY] {
                if let Err(e) = storage.remove_item(key) {
                    warn!("Failed to remove {key}: {e}");
                }
            }
        }
    }
}

/// The browsable mod catalog.
///
/// Hydrated from the persisted snapshot on creation; every later change to the
/// catalog is written back as a slim snapshot.
#[derive(Clone)]
pub struct CatalogStore {
    catalog: Observable<Vec<Mod>>,
    loading: Observable<bool>,
    last_refreshed: Observable<Option<u64>>,
    backend: Arc<dyn Backend>,
    messages: MessageQueue,
    _persistence: Arc<Subscription>,
}

impl CatalogStore {
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        backend: Arc<dyn Backend>,
        messages: MessageQueue,
    ) -> Self {
        let (mods, refreshed) = hydrate(storage.as_ref());
        info!("hydrated {} catalog entries from storage", mods.len());

        let catalog = Observable::new(mods);
        let last_refreshed = Observable::new(refreshed);

        let persistence = {
            let last_refreshed = last_refreshed.clone();
            catalog.subscribe_changes(move |mods: &Vec<Mod>| {
                persist(storage.as_ref(), mods, &last_refreshed)
            })
        };

        Self {
            catalog,
            loading: Observable::new(false),
            last_refreshed,
            backend,
            messages,
            _persistence: Arc::new(persistence),
        }
    }

    pub fn catalog(&self) -> Observable<Vec<Mod>> {
        self.catalog.clone()
    }

    pub fn loading(&self) -> Observable<bool> {
        self.loading.clone()
    }

    pub fn last_refreshed(&self) -> Observable<Option<u64>> {
        self.last_refreshed.clone()
    }

    pub fn mods(&self) -> Vec<Mod> {
        self.catalog.get()
    }

    /// Replaces the catalog wholesale.
    pub fn set(&self, mods: Vec<Mod>) {
        self.catalog.set(mods);
    }

    /// Fetches the full catalog from the backend and replaces the current one.
    ///
    /// On failure the previous catalog is kept and the user is told through the message queue.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> bool {
        self.loading.set(true);
        let result = invoke_typed::<GetModCatalog>(self.backend.as_ref(), &NoArgs {}).await;
        let ok = match result {
            Ok(mods) => {
                info!("catalog refreshed with {} mods", mods.len());
                self.catalog.set(mods);
                true
            }
            Err(e) => {
                error!("Failed to refresh mod catalog: {e}");
                self.messages
                    .push(format!("Failed to load mods: {e}"), Severity::Error);
                false
            }
        };
        self.loading.set(false);
        ok
    }

    /// Marks entries installed when their title or folder name is in `installed`.
    pub fn sync_installed(&self, installed: &[InstalledMod]) {
        let is_installed = |m: &Mod| {
            installed.iter().any(|i| {
                i.matches(&m.title) || m.folder_name.as_deref().is_some_and(|f| i.matches(f))
            })
        };

        let changed = self
            .catalog
            .with(|mods| mods.iter().any(|m| m.installed != is_installed(m)));
        if changed {
            self.catalog.update(|mods| {
                for m in mods.iter_mut() {
                    m.installed = is_installed(&*m);
                }
            });
        }
    }

    pub fn filter_by_category(&self, category: Category) -> Vec<Mod> {
        self.catalog.with(|mods| {
            mods.iter()
                .filter(|m| m.categories.contains(&category))
                .cloned()
                .collect()
        })
    }

    /// Case-insensitive search over title and publisher. A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<Mod> {
        let needle = query.trim().to_lowercase();
        self.catalog.with(|mods| {
            mods.iter()
                .filter(|m| {
                    needle.is_empty()
                        || m.title.to_lowercase().contains(&needle)
                        || m.publisher.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect()
        })
    }

    pub fn sorted(&self, order: SortOrder) -> Vec<Mod> {
        let mut mods = self.mods();
        sort_mods(&mut mods, order);
        mods
    }

    /// Zero-based page of the catalog in its stored order.
    pub fn page(&self, page: usize, per_page: usize) -> Vec<Mod> {
        self.catalog.with(|mods| paginate(mods, page, per_page))
    }

    pub fn page_count(&self, per_page: usize) -> usize {
        page_count(self.catalog.with(Vec::len), per_page)
    }
}

pub fn sort_mods(mods: &mut [Mod], order: SortOrder) {
    match order {
        SortOrder::Title => mods.sort_by_key(|m| m.title.to_lowercase()),
        SortOrder::LastUpdated => mods.sort_by(|a, b| b.last_updated.cmp(&a.last_updated)),
    }
}

/// Returns page `page` (zero-based) of `per_page` items.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Vec<T> {
    if per_page == 0 {
        return Vec::new();
    }
    items
        .iter()
        .skip(page.saturating_mul(per_page))
        .take(per_page)
        .cloned()
        .collect()
}

pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    }
}
