use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

const APP_NAME: &str = "balatro-mod-manager";

/// Settings for the client-side cache layer, stored with `confy`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub version: u8,
    /// How long a fetched installed-mods list is served without asking the backend again.
    pub installed_mods_ttl_ms: u64,
    pub message_expiry_ms: u64,
    pub invoke_timeout_ms: u64,
    pub storage_file: Utf8PathBuf,
    pub image_cache_dir: Utf8PathBuf,
    pub log_dir: Utf8PathBuf,
}

fn data_dir() -> Utf8PathBuf {
    ProjectDirs::from("com", "balatro-mod-manager", APP_NAME)
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.data_dir().to_path_buf()).ok())
        .or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe_path| exe_path.parent().map(|p| p.to_path_buf()))
                .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
        })
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}

impl Default for ClientConfig {
    fn default() -> Self {
        let base_dir = data_dir();

        Self {
            version: 0,
            installed_mods_ttl_ms: 15_000,
            message_expiry_ms: 3_000,
            invoke_timeout_ms: 5_000,
            storage_file: base_dir.join("local-storage.json"),
            image_cache_dir: base_dir.join("cache"),
            log_dir: base_dir.join("logs"),
        }
    }
}

impl ClientConfig {
    pub fn load() -> Result<ClientConfig, confy::ConfyError> {
        confy::load(APP_NAME, None)
    }

    /// Loads the stored configuration, falling back to defaults when it cannot be read.
    pub fn load_or_default() -> ClientConfig {
        Self::load().unwrap_or_else(|e| {
            warn!("Failed to load client config, using defaults: {e}");
            ClientConfig::default()
        })
    }

    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, None, self)
    }

    pub fn installed_mods_ttl(&self) -> Duration {
        Duration::from_millis(self.installed_mods_ttl_ms)
    }

    pub fn message_expiry(&self) -> Duration {
        Duration::from_millis(self.message_expiry_ms)
    }

    pub fn invoke_timeout(&self) -> Duration {
        Duration::from_millis(self.invoke_timeout_ms)
    }
}
