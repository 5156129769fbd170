use crate::core::events::{BackendEvents, INSTALLED_MODS_CHANGED};
use crate::core::mod_cache::InstalledModsCache;
use crate::models::error::SError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

static GLOBAL_LISTENERS: OnceLock<ListenerRegistry> = OnceLock::new();

/// Keeps the installed-mods change listener attached at most once.
#[derive(Default)]
pub struct ListenerRegistry {
    attached: Arc<AtomicBool>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by application startup.
    pub fn global() -> &'static ListenerRegistry {
        GLOBAL_LISTENERS.get_or_init(ListenerRegistry::new)
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Subscribes `cache` to backend "installed mods changed" notifications so it
    /// force-refreshes on out-of-band changes.
    ///
    /// Returns `Ok(None)` if a listener is already attached. The returned guard
    /// detaches the listener when disposed or dropped.
    pub fn install_installed_mods_listener(
        &self,
        cache: &InstalledModsCache,
        events: &dyn BackendEvents,
    ) -> Result<Option<ListenerGuard>, SError> {
        if self
            .attached
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("installed mods listener already attached");
            return Ok(None);
        }

        let attach = || -> Result<JoinHandle<()>, SError> {
            let runtime = tokio::runtime::Handle::try_current()
                .map_err(|e| SError::AsyncRuntimeError(e.to_string()))?;
            let mut rx = events.listen(INSTALLED_MODS_CHANGED)?;
            let cache = cache.clone();

            Ok(runtime.spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            debug!("coalesced {skipped} installed mods notifications");
                        }
                        Err(RecvError::Closed) => {
                            info!("installed mods event channel closed");
                            break;
                        }
                    }
                    cache.force_refresh().await;
                }
            }))
        };

        match attach() {
            Ok(task) => {
                info!("attached {INSTALLED_MODS_CHANGED} listener");
                Ok(Some(ListenerGuard {
                    task: Some(task),
                    attached: self.attached.clone(),
                }))
            }
            Err(e) => {
                warn!("Failed to attach {INSTALLED_MODS_CHANGED} listener: {e}");
                self.attached.store(false, Ordering::Release);
                Err(e)
            }
        }
    }
}

/// Disposer for the change listener. Dropping it detaches the listener and
/// allows a later re-install (used when the host reloads in development).
#[must_use = "dropping the guard detaches the listener"]
pub struct ListenerGuard {
    task: Option<JoinHandle<()>>,
    attached: Arc<AtomicBool>,
}

impl ListenerGuard {
    pub fn dispose(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.attached.store(false, Ordering::Release);
            debug!("detached {INSTALLED_MODS_CHANGED} listener");
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.detach();
    }
}
