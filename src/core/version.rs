use crate::commands::catalog::{GetSteamoddedVersions, GetTalismanVersions};
use crate::commands::{invoke_typed, NoArgs};
use crate::core::backend::Backend;
use crate::core::storage::KeyValueStorage;
use crate::models::error::SError;
use derive_more::Display;
use std::sync::Arc;
use tracing::{error, warn};

/// Mod-loader dependencies whose released versions are cached locally.
#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dependency {
    #[display("steamodded")]
    Steamodded,
    #[display("talisman")]
    Talisman,
}

impl Dependency {
    pub fn storage_key(self) -> String {
        format!("versions-cache.{self}")
    }
}

/// Known version strings per dependency, persisted in local storage.
#[derive(Clone)]
pub struct CachedVersions {
    storage: Arc<dyn KeyValueStorage>,
    backend: Arc<dyn Backend>,
}

impl CachedVersions {
    pub fn new(storage: Arc<dyn KeyValueStorage>, backend: Arc<dyn Backend>) -> Self {
        Self { storage, backend }
    }

    /// Cached versions for `dependency`; empty when nothing usable is stored.
    pub fn get(&self, dependency: Dependency) -> Vec<String> {
        let key = dependency.storage_key();
        match self.storage.get_item(&key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable {key}: {e}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read {key}: {e}");
                Vec::new()
            }
        }
    }

    pub fn set(&self, dependency: Dependency, versions: &[String]) {
        let key = dependency.storage_key();
        let written = serde_json::to_string(versions)
            .map_err(SError::from)
            .and_then(|json| self.storage.set_item(&key, &json));
        if let Err(e) = written {
            warn!("Failed to persist {key}: {e}");
            if let Err(e) = self.storage.remove_item(&key) {
                warn!("Failed to remove {key}: {e}");
            }
        }
    }

    /// Asks the backend for the current version list and caches it.
    /// On failure the previously cached list is returned.
    pub async fn refresh(&self, dependency: Dependency) -> Vec<String> {
        let fetched = match dependency {
            Dependency::Steamodded => {
                invoke_typed::<GetSteamoddedVersions>(self.backend.as_ref(), &NoArgs {}).await
            }
            Dependency::Talisman => {
                invoke_typed::<GetTalismanVersions>(self.backend.as_ref(), &NoArgs {}).await
            }
        };

        match fetched {
            Ok(versions) => {
                self.set(dependency, &versions);
                versions
            }
            Err(e) => {
                error!("Failed to fetch {dependency} versions: {e}");
                self.get(dependency)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStorage;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use serde_json::{json, Value};

    struct Versions;

    impl Backend for Versions {
        fn invoke(&self, command: &str, _args: Value) -> BoxFuture<'static, Result<Value, SError>> {
            let result = match command {
                "get_steamodded_versions" => Ok(json!(["1.0.0~beta-0301a", "1.0.0~alpha-1410b"])),
                other => Err(SError::Backend(format!("{other} unavailable"))),
            };
            async move { result }.boxed()
        }
    }

    #[tokio::test]
    async fn refresh_persists_and_failures_fall_back_to_cache() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let versions = CachedVersions::new(storage.clone(), Arc::new(Versions));

        let fetched = versions.refresh(Dependency::Steamodded).await;
        assert_eq!(fetched.len(), 2);
        assert_eq!(versions.get(Dependency::Steamodded), fetched);
        assert!(storage
            .get_item("versions-cache.steamodded")
            .unwrap()
            .is_some());

        versions.set(Dependency::Talisman, &["2.1".to_string()]);
        assert_eq!(versions.refresh(Dependency::Talisman).await, vec!["2.1".to_string()]);
    }

    #[test]
    fn failed_write_removes_the_stale_list() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::with_quota(40));
        let versions = CachedVersions::new(storage.clone(), Arc::new(Versions));
        versions.set(Dependency::Steamodded, &["1.0".to_string()]);
        assert_eq!(versions.get(Dependency::Steamodded), vec!["1.0".to_string()]);

        let many: Vec<String> = (0..20).map(|i| format!("1.0.{i}")).collect();
        versions.set(Dependency::Steamodded, &many);

        assert!(versions.get(Dependency::Steamodded).is_empty());
        assert_eq!(storage.get_item("versions-cache.steamodded").unwrap(), None);
    }
}
