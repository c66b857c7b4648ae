use chrono::{DateTime, Utc};
use serde::Serialize;

use restock_core::ItemId;
use restock_inventory::{BuyReference, Item, Unit};
use restock_policy::{Decision, PolicyParams};

use crate::ports::NotificationMessage;

/// One evaluated item: display fields of the item merged with its decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRow {
    pub id: ItemId,
    pub name: String,
    pub brand: Option<String>,
    pub unit: Unit,
    /// Stored quantity, before any projection.
    pub quantity_remaining: f64,
    pub buy_reference: Option<BuyReference>,
    #[serde(flatten)]
    pub decision: Decision,
}

impl CheckRow {
    pub fn new(item: &Item, decision: Decision) -> Self {
        Self {
            id: item.id().clone(),
            name: item.name().to_string(),
            brand: item.brand().map(str::to_string),
            unit: item.unit(),
            quantity_remaining: item.quantity_remaining(),
            buy_reference: item.buy_reference().cloned(),
            decision,
        }
    }

    pub fn needs_replenishment(&self) -> bool {
        self.decision.needs_replenishment
    }
}

/// What happened to the notification of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Disabled,
    NothingToReport,
    /// Rendered but not sent.
    DryRun { preview: NotificationMessage },
    Sent { subject: String },
}

/// Target window reported for a run.
///
/// Without an override, each item uses its own lead time + safety stock, so
/// the summary reports the range seen across the batch instead of one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TargetWindowSummary {
    Override {
        days: f64,
    },
    PerItem {
        #[serde(rename = "minDays", skip_serializing_if = "Option::is_none")]
        min_days: Option<f64>,
        #[serde(rename = "maxDays", skip_serializing_if = "Option::is_none")]
        max_days: Option<f64>,
    },
}

impl TargetWindowSummary {
    pub fn for_batch(params: &PolicyParams, items: &[Item]) -> Self {
        if let Some(days) = params.target_window_override {
            return Self::Override { days };
        }
        let windows = items.iter().map(Item::default_target_window_days);
        Self::PerItem {
            min_days: windows.clone().reduce(f64::min),
            max_days: windows.reduce(f64::max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyWindowSummary {
    pub review_horizon_days: f64,
    pub target_window: TargetWindowSummary,
}

/// Result of a complete check run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    pub generated_at: DateTime<Utc>,
    pub dry_run: bool,
    pub checked_count: usize,
    /// Items needing replenishment (the notifiable set), sent or not.
    pub notified_count: usize,
    /// Updates handed to the store; zero on dry runs.
    pub persisted_count: usize,
    pub notification: NotificationOutcome,
    pub policy: PolicyWindowSummary,
    /// Every evaluated item, in inventory order.
    pub rows: Vec<CheckRow>,
}
