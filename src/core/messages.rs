use crate::core::observable::Observable;
use crate::models::message::{Message, MessageId, Severity};
use std::time::Duration;
use tracing::{debug, warn};

/// Toast notifications. Each message removes itself after `expiry`.
#[derive(Clone)]
pub struct MessageQueue {
    messages: Observable<Vec<Message>>,
    expiry: Duration,
}

impl MessageQueue {
    pub fn new(expiry: Duration) -> Self {
        Self {
            messages: Observable::new(Vec::new()),
            expiry,
        }
    }

    pub fn messages(&self) -> Observable<Vec<Message>> {
        self.messages.clone()
    }

    pub fn current(&self) -> Vec<Message> {
        self.messages.get()
    }

    /// Shows `text` and schedules its removal. Identical texts are independent messages.
    pub fn push(&self, text: impl Into<String>, severity: Severity) -> MessageId {
        let message = Message {
            text: text.into(),
            severity,
            id: MessageId::new(),
        };
        let id = message.id;
        debug!("message [{severity}] {}", message.text);
        self.messages.update(|list| list.push(message));

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let queue = self.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(queue.expiry).await;
                    queue.dismiss(id);
                });
            }
            Err(_) => warn!("No async runtime, message {id} will not expire"),
        }
        id
    }

    pub fn dismiss(&self, id: MessageId) {
        self.messages.update(|list| list.retain(|m| m.id != id));
    }
}
