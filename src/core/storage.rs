use crate::models::error::SError;
use crate::utils::file::FileUtils;
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Durable string key-value storage shared by every persisted store.
///
/// Each store owns its own keys; writes from different stores are independent.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, SError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), SError>;
    fn remove_item(&self, key: &str) -> Result<(), SError>;
}

fn stored_size(map: &BTreeMap<String, String>) -> usize {
    map.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// Inserts into `map` unless the result would exceed `quota`; the map is left untouched on failure.
fn insert_within_quota(
    map: &mut BTreeMap<String, String>,
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> Result<Option<String>, SError> {
    let previous = map.insert(key.to_string(), value.to_string());
    if let Some(limit) = quota {
        let size = stored_size(map);
        if size > limit {
            match &previous {
                Some(old) => map.insert(key.to_string(), old.clone()),
                None => map.remove(key),
            };
            return Err(SError::QuotaExceeded(format!(
                "writing {key} needs {size} bytes, limit is {limit}"
            )));
        }
    }
    Ok(previous)
}

/// In-memory storage with an optional byte quota.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            quota: Some(quota),
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SError> {
        insert_within_quota(&mut self.items.lock(), self.quota, key, value).map(|_| ())
    }

    fn remove_item(&self, key: &str) -> Result<(), SError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object on disk, rewritten on every change.
pub struct JsonFileStorage {
    path: Utf8PathBuf,
    items: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl JsonFileStorage {
    /// Opens the storage file. A missing file starts empty; an unreadable one is
    /// logged and treated as empty so a corrupt file never blocks startup.
    pub fn open(path: &Utf8Path) -> Self {
        let items = match FileUtils::read_optional(path) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Discarding unreadable storage file {path}: {e}");
                BTreeMap::new()
            }),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read storage file {path}: {e}");
                BTreeMap::new()
            }
        };
        debug!("Opened storage {path} with {} keys", items.len());

        Self {
            path: path.to_owned(),
            items: Mutex::new(items),
            quota: None,
        }
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<(), SError> {
        let json = serde_json::to_vec_pretty(items)?;
        FileUtils::write_atomic(&self.path, &json)
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SError> {
        let mut items = self.items.lock();
        let previous = insert_within_quota(&mut items, self.quota, key, value)?;
        if let Err(e) = self.flush(&items) {
            match previous {
                Some(old) => items.insert(key.to_string(), old),
                None => items.remove(key),
            };
            return Err(SError::Storage(e.to_string()));
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SError> {
        let mut items = self.items.lock();
        if items.remove(key).is_some() {
            self.flush(&items)
                .map_err(|e| SError::Storage(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_quota_rejects_and_keeps_previous_value() {
        let storage = MemoryStorage::with_quota(12);
        storage.set_item("k", "small").unwrap();

        let err = storage.set_item("k", "much too large").unwrap_err();
        assert!(matches!(err, SError::QuotaExceeded(_)));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn json_file_storage_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("storage.json")).unwrap();

        let storage = JsonFileStorage::open(&path);
        storage.set_item("ui.cardScale", "1.2").unwrap();
        storage.set_item("gone", "x").unwrap();
        storage.remove_item("gone").unwrap();
        drop(storage);

        let reopened = JsonFileStorage::open(&path);
        assert_eq!(reopened.get_item("ui.cardScale").unwrap().as_deref(), Some("1.2"));
        assert_eq!(reopened.get_item("gone").unwrap(), None);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("storage.json")).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let storage = JsonFileStorage::open(&path);
        assert_eq!(storage.get_item("anything").unwrap(), None);
    }
}
