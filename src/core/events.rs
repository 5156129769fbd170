use crate::models::error::SError;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::trace;

pub const INSTALLED_MODS_CHANGED: &str = "installed-mods-changed";

const CHANNEL_CAPACITY: usize = 16;

/// Source of backend-pushed notifications.
pub trait BackendEvents: Send + Sync {
    fn listen(&self, event: &str) -> Result<broadcast::Receiver<Value>, SError>;
}

/// In-process event bus; the host bridge forwards backend events through [`ChannelEvents::emit`].
#[derive(Default)]
pub struct ChannelEvents {
    channels: Mutex<HashMap<String, broadcast::Sender<Value>>>,
}

impl ChannelEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `payload` to current listeners of `event`, returning how many received it.
    pub fn emit(&self, event: &str, payload: Value) -> usize {
        let sender = self.channels.lock().get(event).cloned();
        let delivered = sender.map(|s| s.send(payload).unwrap_or(0)).unwrap_or(0);
        trace!("emitted {event} to {delivered} listeners");
        delivered
    }
}

impl BackendEvents for ChannelEvents {
    fn listen(&self, event: &str) -> Result<broadcast::Receiver<Value>, SError> {
        let mut channels = self.channels.lock();
        let sender = channels
            .entry(event.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        Ok(sender.subscribe())
    }
}
