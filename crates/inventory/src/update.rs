use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use restock_core::ItemId;

/// Why a replenishment decision was reached.
///
/// Closed and stable: stores and reports depend on these exact values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    AutoSubscriptionActive,
    DepletedOrInvalid,
    InsufficientConsumptionData,
    WithinTargetWindow,
    SufficientStock,
}

impl ReasonCode {
    pub const ALL: [ReasonCode; 5] = [
        ReasonCode::AutoSubscriptionActive,
        ReasonCode::DepletedOrInvalid,
        ReasonCode::InsufficientConsumptionData,
        ReasonCode::WithinTargetWindow,
        ReasonCode::SufficientStock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::AutoSubscriptionActive => "AUTO_SUBSCRIPTION_ACTIVE",
            ReasonCode::DepletedOrInvalid => "DEPLETED_OR_INVALID",
            ReasonCode::InsufficientConsumptionData => "INSUFFICIENT_CONSUMPTION_DATA",
            ReasonCode::WithinTargetWindow => "WITHIN_TARGET_WINDOW",
            ReasonCode::SufficientStock => "SUFFICIENT_STOCK",
        }
    }
}

impl core::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item attributes owned by the replenishment check, never by the store's users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedAttributes {
    pub needs_replenishment: bool,
    pub replenish_by_date: Option<NaiveDate>,
    pub recommended_order_qty: Option<f64>,
    pub reason_code: ReasonCode,
    pub last_check_at: DateTime<Utc>,
}

/// What a check writes back for one item.
///
/// `calculated_quantity` is the current stock the check worked with. Stores
/// only write it when the save was explicitly asked to update quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub id: ItemId,
    #[serde(flatten)]
    pub derived: DerivedAttributes,
    pub calculated_quantity: f64,
}
