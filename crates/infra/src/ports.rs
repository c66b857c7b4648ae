//! Collaborator ports consumed by the replenishment use case.
//!
//! Retries, backoff and credentials are the adapters' concern; the use case
//! calls each port at most once per run and propagates failures unchanged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use restock_inventory::{Item, ItemUpdate};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which collaborator failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collaborator {
    InventorySource,
    NotificationSink,
}

impl core::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Collaborator::InventorySource => "inventory_source",
            Collaborator::NotificationSink => "notification_sink",
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterErrorKind {
    Transport,
    Auth,
    RateLimited,
    Io,
    Malformed,
}

impl core::fmt::Display for AdapterErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            AdapterErrorKind::Transport => "transport",
            AdapterErrorKind::Auth => "auth",
            AdapterErrorKind::RateLimited => "rate_limited",
            AdapterErrorKind::Io => "io",
            AdapterErrorKind::Malformed => "malformed",
        })
    }
}

/// Failure of an inventory source or notification sink.
#[derive(Debug, Error)]
#[error("{collaborator}.{operation} failed ({kind}): {source}")]
pub struct AdapterError {
    pub collaborator: Collaborator,
    pub operation: &'static str,
    pub kind: AdapterErrorKind,
    #[source]
    pub source: BoxError,
}

impl AdapterError {
    pub fn new(
        collaborator: Collaborator,
        operation: &'static str,
        kind: AdapterErrorKind,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            collaborator,
            operation,
            kind,
            source: source.into(),
        }
    }

    pub fn inventory(operation: &'static str, kind: AdapterErrorKind, source: impl Into<BoxError>) -> Self {
        Self::new(Collaborator::InventorySource, operation, kind, source)
    }

    pub fn notification(operation: &'static str, kind: AdapterErrorKind, source: impl Into<BoxError>) -> Self {
        Self::new(Collaborator::NotificationSink, operation, kind, source)
    }
}

/// Options for a batched save.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    /// Also overwrite the stored quantity with the calculated one.
    pub update_quantities: bool,
}

/// Inventory store port.
#[async_trait::async_trait]
pub trait InventorySource: Send + Sync {
    /// All structurally valid items. Invalid rows are dropped (and logged) by the adapter.
    async fn list(&self) -> Result<Vec<Item>, AdapterError>;

    /// Write derived attributes for a batch of items.
    ///
    /// Must never touch caller-owned columns, except the quantity column when
    /// `options.update_quantities` is set.
    async fn save(&self, updates: &[ItemUpdate], options: SaveOptions) -> Result<(), AdapterError>;
}

#[async_trait::async_trait]
impl<S> InventorySource for Arc<S>
where
    S: InventorySource + ?Sized,
{
    async fn list(&self) -> Result<Vec<Item>, AdapterError> {
        (**self).list().await
    }

    async fn save(&self, updates: &[ItemUpdate], options: SaveOptions) -> Result<(), AdapterError> {
        (**self).save(updates, options).await
    }
}

/// Message handed to a notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMessage {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rich_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plain_body: Option<String>,
}

impl NotificationMessage {
    /// Sinks reject messages without a subject or without any body.
    pub fn check_sendable(&self) -> Result<(), AdapterError> {
        if self.subject.trim().is_empty() {
            return Err(AdapterError::notification(
                "send",
                AdapterErrorKind::Malformed,
                "message subject is empty",
            ));
        }
        if self.rich_body.is_none() && self.plain_body.is_none() {
            return Err(AdapterError::notification(
                "send",
                AdapterErrorKind::Malformed,
                "message needs a rich or plain body",
            ));
        }
        Ok(())
    }
}

/// Notification transport port.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, message: &NotificationMessage) -> Result<(), AdapterError>;
}

#[async_trait::async_trait]
impl<S> NotificationSink for Arc<S>
where
    S: NotificationSink + ?Sized,
{
    async fn send(&self, message: &NotificationMessage) -> Result<(), AdapterError> {
        (**self).send(message).await
    }
}

/// Wall-clock port.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_error_names_the_collaborator() {
        let err = AdapterError::inventory(
            "list",
            AdapterErrorKind::RateLimited,
            "429 too many requests",
        );
        assert_eq!(
            err.to_string(),
            "inventory_source.list failed (rate_limited): 429 too many requests"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn message_without_body_is_not_sendable() {
        let msg = NotificationMessage {
            subject: "hello".to_string(),
            rich_body: None,
            plain_body: None,
        };
        let err = msg.check_sendable().unwrap_err();
        assert_eq!(err.collaborator, Collaborator::NotificationSink);
        assert_eq!(err.kind, AdapterErrorKind::Malformed);

        let ok = NotificationMessage {
            plain_body: Some("body".to_string()),
            ..msg
        };
        assert!(ok.check_sendable().is_ok());
    }
}
