#![allow(dead_code)]

use bmm_client_lib::core::backend::Backend;
use bmm_client_lib::core::image_cache::ImageFetcher;
use bmm_client_lib::models::error::SError;
use camino::Utf8PathBuf;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// Scripted backend that counts calls per command.
#[derive(Default)]
pub struct MockBackend {
    responses: Mutex<HashMap<String, Result<Value, SError>>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Mutex<Option<Duration>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, command: &str, value: Value) {
        self.responses
            .lock()
            .insert(command.to_string(), Ok(value));
    }

    pub fn fail(&self, command: &str, message: &str) {
        self.responses
            .lock()
            .insert(command.to_string(), Err(SError::Backend(message.to_string())));
    }

    /// Every call waits this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self, command: &str) -> usize {
        self.calls.lock().get(command).copied().unwrap_or(0)
    }

    pub fn set_installed(&self, names: &[&str]) {
        let records: Vec<Value> = names
            .iter()
            .map(|n| {
                json!({
                    "name": n,
                    "path": format!("/mods/{n}"),
                    "dependencies": [],
                    "current_version": null
                })
            })
            .collect();
        self.respond("get_installed_mods_from_db", Value::Array(records));
    }
}

impl Backend for MockBackend {
    fn invoke(&self, command: &str, _args: Value) -> BoxFuture<'static, Result<Value, SError>> {
        *self.calls.lock().entry(command.to_string()).or_default() += 1;
        let response = self
            .responses
            .lock()
            .get(command)
            .cloned()
            .unwrap_or_else(|| Err(SError::Backend(format!("unknown command {command}"))));
        let delay = *self.delay.lock();

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        }
        .boxed()
    }
}

/// Image fetcher serving fixed bytes, or failing for URLs containing "broken".
#[derive(Default)]
pub struct MockFetcher {
    fetched: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A fetcher whose downloads wait until `open` is called.
    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            fetched: Mutex::new(Vec::new()),
            gate: Some(Arc::new(Semaphore::new(0))),
        })
    }

    pub fn open(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().clone()
    }
}

pub const IMAGE_BYTES: &[u8] = b"\x89PNG fake image";

impl ImageFetcher for MockFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, SError>> {
        self.fetched.lock().push(url.to_string());
        let broken = url.contains("broken");
        let gate = self.gate.clone();
        async move {
            if let Some(gate) = gate {
                let _permit = gate.acquire().await;
            }
            if broken {
                Err(SError::Network("Failed to download image: 404 Not Found".into()))
            } else {
                Ok(IMAGE_BYTES.to_vec())
            }
        }
        .boxed()
    }
}

pub fn temp_root() -> (TempDir, Utf8PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
    (tmp, root)
}
