//! Replenishment check use case.
//!
//! - `check.rs`: the orchestrator (load → evaluate → persist → notify → summarise)
//! - `report.rs`: renders the notifiable rows into one message
//! - `summary.rs`: result rows and the run summary returned to callers

use serde::{Deserialize, Serialize};
use thiserror::Error;

use restock_core::{FieldError, ValidationError};

use crate::ports::AdapterError;

pub mod check;
pub mod report;
pub mod summary;

pub use check::ReplenishmentCheck;
pub use report::build_report;
pub use summary::{CheckRow, CheckSummary, NotificationOutcome, PolicyWindowSummary, TargetWindowSummary};

/// Subject prefix used when neither the request nor the service sets one.
pub const DEFAULT_SUBJECT_PREFIX: &str = "[Restock]";

const MAX_SUBJECT_PREFIX_CHARS: usize = 120;

/// Notification settings of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub enabled: bool,
    /// Compute everything but neither persist nor send.
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub subject_prefix: Option<String>,
}

impl NotificationOptions {
    pub fn notify() -> Self {
        Self {
            enabled: true,
            dry_run: false,
            subject_prefix: None,
        }
    }

    pub fn silent() -> Self {
        Self {
            enabled: false,
            ..Self::notify()
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subject_prefix = Some(prefix.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if let Some(prefix) = &self.subject_prefix {
            check_subject_prefix(&mut errors, "notification.subjectPrefix", prefix);
        }
        ValidationError::from_collected(errors)
    }
}

/// Push a [`FieldError`] for `field` when `prefix` is not a usable subject prefix.
pub fn check_subject_prefix(errors: &mut Vec<FieldError>, field: &str, prefix: &str) {
    if prefix.trim().is_empty() {
        errors.push(FieldError::new(field, "must not be blank"));
    } else if prefix.contains(['\n', '\r']) {
        errors.push(FieldError::new(field, "must be a single line"));
    } else if prefix.chars().count() > MAX_SUBJECT_PREFIX_CHARS {
        errors.push(FieldError::new(
            field,
            format!("must be at most {MAX_SUBJECT_PREFIX_CHARS} characters"),
        ));
    }
}

/// Why a check run produced no summary.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The request configuration was rejected before any IO happened.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A collaborator failed; nothing after the failing call was attempted.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}
