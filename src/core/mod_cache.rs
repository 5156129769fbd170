use crate::commands::mods::{GetDetectedLocalMods, GetInstalledMods};
use crate::commands::{invoke_typed, NoArgs};
use crate::core::backend::Backend;
use crate::core::observable::Observable;
use crate::models::error::SError;
use crate::models::mod_dto::{DetectedMod, InstalledMod};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, instrument};

type PendingFetch = Shared<BoxFuture<'static, Result<Vec<InstalledMod>, SError>>>;

#[derive(Default)]
struct FetchState {
    /// Completion time of the last successful fetch; `None` until the first one lands.
    last_fetch: Option<Instant>,
    in_flight: Option<(u64, PendingFetch)>,
    generation: u64,
}

impl FetchState {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.last_fetch
            .is_some_and(|at| now.saturating_duration_since(at) <= ttl)
    }
}

struct Inner {
    backend: Arc<dyn Backend>,
    ttl: Duration,
    cache: Observable<Vec<InstalledMod>>,
    state: Mutex<FetchState>,
}

/// TTL cache over the backend's installed-mods query.
///
/// Concurrent fetches share one backend call. A failed fetch leaves the
/// cached list untouched and clears the in-flight slot so the next call retries.
/// Freshness is measured from when a fetch *completes*, so a slow backend call
/// never makes its own result look older than it is.
#[derive(Clone)]
pub struct InstalledModsCache {
    inner: Arc<Inner>,
}

impl InstalledModsCache {
    pub fn new(backend: Arc<dyn Backend>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                ttl,
                cache: Observable::new(Vec::new()),
                state: Mutex::new(FetchState::default()),
            }),
        }
    }

    /// The observable list readers subscribe to.
    pub fn installed_mods(&self) -> Observable<Vec<InstalledMod>> {
        self.inner.cache.clone()
    }

    /// Current cached list, without checking freshness.
    pub fn cached(&self) -> Vec<InstalledMod> {
        self.inner.cache.get()
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    pub fn last_fetch(&self) -> Option<Instant> {
        self.inner.state.lock().last_fetch
    }

    pub fn is_fetching(&self) -> bool {
        self.inner.state.lock().in_flight.is_some()
    }

    /// Returns the installed mods, asking the backend only when forced or when
    /// the cached list is missing or older than the TTL.
    ///
    /// Backend failures are logged and reported as an empty list.
    pub async fn fetch(&self, force_refresh: bool) -> Vec<InstalledMod> {
        self.try_fetch(force_refresh).await.unwrap_or_default()
    }

    /// Like [`fetch`](Self::fetch), but hands the backend error to the caller
    /// instead of an empty list.
    pub async fn try_fetch(&self, force_refresh: bool) -> Result<Vec<InstalledMod>, SError> {
        let pending = {
            let mut state = self.inner.state.lock();
            if !force_refresh && state.is_fresh(Instant::now(), self.inner.ttl) {
                return Ok(self.inner.cache.get());
            }

            match &state.in_flight {
                Some((_, pending)) => {
                    debug!("joining in-flight installed mods fetch");
                    pending.clone()
                }
                None => {
                    state.generation += 1;
                    let generation = state.generation;
                    let pending = Self::load(self.inner.clone(), generation).boxed().shared();
                    state.in_flight = Some((generation, pending.clone()));
                    pending
                }
            }
        };

        pending.await
    }

    pub async fn force_refresh(&self) -> Vec<InstalledMod> {
        self.fetch(true).await
    }

    /// Case-insensitive membership test. Blank names are never installed and never hit the backend.
    pub async fn contains(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        self.fetch(false).await.iter().any(|m| m.matches(name))
    }

    /// Mods found on disk that the installed list does not know about.
    #[instrument(skip(self))]
    pub async fn untracked_mods(&self) -> Vec<DetectedMod> {
        let detected =
            match invoke_typed::<GetDetectedLocalMods>(self.inner.backend.as_ref(), &NoArgs {})
                .await
            {
                Ok(detected) => detected,
                Err(e) => {
                    error!("Failed to check for untracked mods: {e}");
                    return Vec::new();
                }
            };

        let installed = self.fetch(false).await;
        detected
            .into_iter()
            .filter(|d| !installed.iter().any(|m| m.matches(&d.name)))
            .collect()
    }

    async fn load(inner: Arc<Inner>, generation: u64) -> Result<Vec<InstalledMod>, SError> {
        let result = invoke_typed::<GetInstalledMods>(inner.backend.as_ref(), &NoArgs {})
            .await
            .map(|records| {
                records
                    .into_iter()
                    .map(InstalledMod::from)
                    .collect::<Vec<_>>()
            });

        match &result {
            Ok(mods) => {
                debug!("fetched {} installed mods", mods.len());
                inner.cache.set(mods.clone());
            }
            Err(e) => error!("Failed to get installed mods: {e}"),
        }

        let mut state = inner.state.lock();
        if result.is_ok() {
            state.last_fetch = Some(Instant::now());
        }
        if state
            .in_flight
            .as_ref()
            .is_some_and(|(g, _)| *g == generation)
        {
            state.in_flight = None;
        }

        result
    }
}
