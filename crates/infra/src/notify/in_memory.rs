use std::sync::Mutex;

use crate::ports::{AdapterError, AdapterErrorKind, NotificationMessage, NotificationSink};

/// Notification sink that records every message (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryNotificationSink {
    inner: Mutex<Vec<NotificationMessage>>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<NotificationMessage> {
        self.inner.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn send(&self, message: &NotificationMessage) -> Result<(), AdapterError> {
        message.check_sendable()?;
        self.inner
            .lock()
            .map_err(|_| AdapterError::notification("send", AdapterErrorKind::Io, "sink lock poisoned"))?
            .push(message.clone());
        Ok(())
    }
}
