use crate::models::error::SError;
use crate::utils::data_uri::to_data_uri;
use crate::utils::file::FileUtils;
use camino::{Utf8Path, Utf8PathBuf};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Downloads remote image bytes.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, SError>>;
}

#[derive(Clone, Default)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, SError>> {
        let client = self.client.clone();
        let url = url.to_string();
        async move {
            let res = client.get(&url).send().await?;
            if !res.status().is_success() {
                return Err(SError::Network(format!(
                    "Failed to download image: {}",
                    res.status()
                )));
            }
            Ok(res.bytes().await?.to_vec())
        }
        .boxed()
    }
}

/// File name an image is cached under: the last path segment of its URL.
///
/// Different URLs ending in the same file name share one entry.
pub fn cache_key(url: &str) -> Option<String> {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();
    let name = without_query.rsplit('/').next().unwrap_or_default();

    match name {
        "" | "." | ".." => None,
        n if n.contains('\\') => None,
        n => Some(n.to_string()),
    }
}

/// Disk cache for remote images.
///
/// A miss returns the original URL straight away and downloads in the
/// background; only later lookups are served from disk.
#[derive(Clone)]
pub struct ImageCache {
    dir: Utf8PathBuf,
    fetcher: Arc<dyn ImageFetcher>,
    pending: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl ImageCache {
    pub fn new(dir: &Utf8Path, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            dir: dir.to_owned(),
            fetcher,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Returns a `data:` URI for a cached image, or `url` itself on a miss.
    pub async fn get(&self, url: &str) -> String {
        let Some(key) = cache_key(url) else {
            debug!("no usable cache key for {url}");
            return url.to_string();
        };
        let path = self.dir.join(&key);

        match tokio::fs::read(&path).await {
            Ok(bytes) => return to_data_uri(&key, &bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to read cached image {path}: {e}"),
        }

        self.spawn_download(url, key, path);
        url.to_string()
    }

    /// Waits for every background download started so far.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> =
            self.pending.lock().drain().map(|(_, h)| h).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Image download task failed: {e}");
            }
        }
    }

    pub fn pending_downloads(&self) -> usize {
        self.pending.lock().len()
    }

    /// Deletes every cached image.
    pub fn clear(&self) -> Result<(), SError> {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SError::IOError(format!(
                "Failed to clear image cache at {}: {e}",
                self.dir
            ))),
        }
    }

    fn spawn_download(&self, url: &str, key: String, path: Utf8PathBuf) {
        let mut pending = self.pending.lock();
        if pending.contains_key(&key) {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, not caching {url}");
            return;
        };

        let fetch = self.fetcher.fetch(url);
        let url = url.to_string();
        let registry = self.pending.clone();
        let task_key = key.clone();

        let handle = runtime.spawn(async move {
            let result = match fetch.await {
                Ok(bytes) => {
                    tokio::task::spawn_blocking(move || FileUtils::write_atomic(&path, &bytes))
                        .await
                        .map_err(SError::from)
                        .and_then(|r| r)
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => debug!("cached image {url}"),
                Err(e) => error!("Error caching image {url}: {e}"),
            }
            registry.lock().remove(&task_key);
        });

        pending.insert(key, handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_last_path_segment() {
        assert_eq!(
            cache_key("https://example.com/mods/Joker/thumb.png?raw=1").as_deref(),
            Some("thumb.png")
        );
        assert_eq!(cache_key("https://example.com/a/b.jpg#x").as_deref(), Some("b.jpg"));
        assert_eq!(cache_key("https://example.com/dir/"), None);
        assert_eq!(cache_key("https://example.com/.."), None);
    }
}
