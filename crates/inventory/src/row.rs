//! Raw store rows and their structural validation.
//!
//! Stores hand back loosely-typed rows. A row becomes an [`Item`] only when
//! its structural fields (id, name, unit, quantity) are present and valid;
//! otherwise it is rejected with a reason the adapter can log.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use restock_core::ItemId;

use crate::item::{BuyReference, Item, ItemBuilder, Unit};

/// One inventory row as stored (camelCase keys). Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub unit: Option<String>,
    pub quantity_remaining: Option<f64>,
    pub avg_daily_consumption: Option<f64>,
    pub avg_monthly_consumption: Option<f64>,
    pub last_replenished_at: Option<String>,
    pub auto_subscription_active: Option<bool>,
    pub buy_reference: Option<BuyReference>,
    pub lead_time_days: Option<f64>,
    pub safety_stock_days: Option<f64>,
    pub min_order_qty: Option<f64>,
    pub pack_size: Option<f64>,
}

/// Why a row was dropped before reaching the decision engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    /// The row id, when one could be read.
    pub id: Option<String>,
    pub reason: String,
}

impl RowRejection {
    fn new(id: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            id,
            reason: reason.into(),
        }
    }
}

impl core::fmt::Display for RowRejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "row {id}: {}", self.reason),
            None => write!(f, "row without id: {}", self.reason),
        }
    }
}

impl ItemRow {
    /// Parse and validate a row from arbitrary JSON.
    pub fn parse_value(value: JsonValue) -> Result<Item, RowRejection> {
        let id_hint = value
            .get("id")
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        let row: ItemRow = serde_json::from_value(value)
            .map_err(|e| RowRejection::new(id_hint, format!("malformed row: {e}")))?;

        Item::try_from(row)
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = RowRejection;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let raw_id = row.id.clone();

        let id = match row.id.as_deref().map(ItemId::new) {
            Some(Ok(id)) => id,
            Some(Err(_)) | None => return Err(RowRejection::new(raw_id, "missing id")),
        };
        let reject = |reason: String| RowRejection::new(Some(id.to_string()), reason);

        let name = match row.name {
            Some(n) if !n.trim().is_empty() => n,
            _ => return Err(reject("missing name".to_string())),
        };

        let unit: Unit = match row.unit.as_deref() {
            Some(u) => u.parse().map_err(|e| reject(format!("invalid unit: {e}")))?,
            None => return Err(reject("missing unit".to_string())),
        };

        let quantity = match row.quantity_remaining {
            Some(q) if q.is_finite() => q,
            Some(_) => return Err(reject("quantityRemaining is not a finite number".to_string())),
            None => return Err(reject("missing quantityRemaining".to_string())),
        };

        let mut builder = ItemBuilder::new(id.clone(), name, unit, quantity)
            .auto_subscription(row.auto_subscription_active.unwrap_or(false));

        if let Some(brand) = row.brand {
            builder = builder.brand(brand);
        }
        if let Some(rate) = row.avg_daily_consumption {
            builder = builder.daily_consumption(rate);
        }
        if let Some(rate) = row.avg_monthly_consumption {
            builder = builder.monthly_consumption(rate);
        }
        if let Some(at) = row.last_replenished_at.as_deref().and_then(parse_timestamp) {
            builder = builder.last_replenished_at(at);
        }
        if let Some(reference) = row.buy_reference {
            builder = builder.buy_reference(reference);
        }
        if let Some(days) = row.lead_time_days {
            builder = builder.lead_time_days(days);
        }
        if let Some(days) = row.safety_stock_days {
            builder = builder.safety_stock_days(days);
        }
        if let Some(qty) = row.min_order_qty {
            builder = builder.min_order_qty(qty);
        }
        if let Some(size) = row.pack_size {
            builder = builder.pack_size(size);
        }

        builder.build().map_err(|e| reject(e.to_string()))
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
/// Anything else is treated as "no replenishment recorded".
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn parses_full_row() {
        let item = ItemRow::parse_value(json!({
            "id": "olive-oil",
            "name": "Olive oil",
            "brand": "Frantoio",
            "unit": "volume-ml",
            "quantityRemaining": 750,
            "avgMonthlyConsumption": 500,
            "lastReplenishedAt": "2024-03-01T08:00:00Z",
            "autoSubscriptionActive": false,
            "buyReference": { "place": "Corner shop", "url": "https://example.com/oil" },
            "leadTimeDays": 1,
            "safetyStockDays": 4,
            "minOrderQty": 500,
            "packSize": 750,
            "needsReplenishment": true
        }))
        .unwrap();

        assert_eq!(item.id().as_str(), "olive-oil");
        assert_eq!(item.unit(), Unit::VolumeMl);
        assert_eq!(item.brand(), Some("Frantoio"));
        assert_eq!(item.avg_monthly_consumption(), Some(500.0));
        assert_eq!(
            item.last_replenished_at(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap())
        );
        assert_eq!(item.default_target_window_days(), 5.0);
        assert_eq!(item.pack_size(), Some(750.0));
    }

    #[test]
    fn rejects_missing_structural_fields() {
        let cases = [
            (json!({ "name": "A", "unit": "g", "quantityRemaining": 1 }), "missing id"),
            (json!({ "id": "a", "unit": "g", "quantityRemaining": 1 }), "missing name"),
            (json!({ "id": "a", "name": "A", "quantityRemaining": 1 }), "missing unit"),
            (json!({ "id": "a", "name": "A", "unit": "g" }), "missing quantityRemaining"),
        ];

        for (row, reason) in cases {
            let err = ItemRow::parse_value(row).unwrap_err();
            assert_eq!(err.reason, reason);
        }
    }

    #[test]
    fn rejects_invalid_unit_with_id() {
        let err = ItemRow::parse_value(json!({
            "id": "rice", "name": "Rice", "unit": "kg", "quantityRemaining": 2
        }))
        .unwrap_err();

        assert_eq!(err.id.as_deref(), Some("rice"));
        assert!(err.reason.starts_with("invalid unit"));
    }

    #[test]
    fn rejects_wrongly_typed_row() {
        let err = ItemRow::parse_value(json!({
            "id": "rice", "name": "Rice", "unit": "g", "quantityRemaining": "lots"
        }))
        .unwrap_err();

        assert_eq!(err.id.as_deref(), Some("rice"));
        assert!(err.reason.starts_with("malformed row"));
    }

    #[test]
    fn bare_dates_and_garbage_timestamps() {
        let dated = ItemRow::parse_value(json!({
            "id": "a", "name": "A", "unit": "g", "quantityRemaining": 1,
            "lastReplenishedAt": "2024-05-02"
        }))
        .unwrap();
        assert_eq!(
            dated.last_replenished_at(),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap())
        );

        let garbage = ItemRow::parse_value(json!({
            "id": "a", "name": "A", "unit": "g", "quantityRemaining": 1,
            "lastReplenishedAt": "last tuesday"
        }))
        .unwrap();
        assert!(garbage.last_replenished_at().is_none());
    }
}
