use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use restock_inventory::{DerivedAttributes, Item, ItemUpdate, ReasonCode};

/// Replenishment decision for one item in one run.
///
/// Ephemeral: only the fields mapped by [`Decision::to_update`] are persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub needs_replenishment: bool,
    pub recommended_order_qty: Option<f64>,
    pub replenish_by_date: Option<NaiveDate>,
    pub reason_code: ReasonCode,
    pub days_until_depletion: Option<f64>,
    /// Stock the decision was based on (projected when projection is enabled).
    pub current_stock: f64,
    pub days_since_replenishment: Option<f64>,
    pub effective_daily_consumption: Option<f64>,
    /// Window compared against `days_until_depletion`; `None` when no rate was usable.
    pub target_window_days: Option<f64>,
}

impl Decision {
    /// Build the record written back for `item`, leaving `item` untouched.
    pub fn to_update(&self, item: &Item, checked_at: DateTime<Utc>) -> ItemUpdate {
        ItemUpdate {
            id: item.id().clone(),
            derived: DerivedAttributes {
                needs_replenishment: self.needs_replenishment,
                replenish_by_date: self.replenish_by_date,
                recommended_order_qty: self.recommended_order_qty,
                reason_code: self.reason_code,
                last_check_at: checked_at,
            },
            calculated_quantity: self.current_stock,
        }
    }
}
