use tracing::info;

use crate::ports::{AdapterError, NotificationMessage, NotificationSink};

/// Delivers notifications to the process log.
///
/// Default sink when no transport is configured; the plain body is logged
/// (falling back to the rich one).
#[derive(Debug, Default, Copy, Clone)]
pub struct LogNotificationSink;

#[async_trait::async_trait]
impl NotificationSink for LogNotificationSink {
    async fn send(&self, message: &NotificationMessage) -> Result<(), AdapterError> {
        message.check_sendable()?;
        let body = message
            .plain_body
            .as_deref()
            .or(message.rich_body.as_deref())
            .unwrap_or_default();
        info!(subject = %message.subject, body = %body, "replenishment notification");
        Ok(())
    }
}
