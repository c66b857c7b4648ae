use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use restock_core::{DomainError, DomainResult, ItemId};

/// Default supplier lead time, in days.
pub const DEFAULT_LEAD_TIME_DAYS: f64 = 2.0;

/// Default safety stock, in days of consumption.
pub const DEFAULT_SAFETY_STOCK_DAYS: f64 = 3.0;

/// Measurement unit of an item's quantities.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "count")]
    Count,
    #[serde(rename = "ml", alias = "volume-ml")]
    VolumeMl,
    #[serde(rename = "g", alias = "mass-g")]
    MassG,
}

impl Unit {
    /// Short label used when rendering quantities.
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Count => "pcs",
            Unit::VolumeMl => "ml",
            Unit::MassG => "g",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Count => "count",
            Unit::VolumeMl => "ml",
            Unit::MassG => "g",
        }
    }
}

impl core::str::FromStr for Unit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" | "pcs" | "unit" | "units" => Ok(Unit::Count),
            "ml" | "volume-ml" => Ok(Unit::VolumeMl),
            "g" | "mass-g" => Ok(Unit::MassG),
            other => Err(DomainError::validation(format!(
                "unit must be one of: count, ml, g (got {other:?})"
            ))),
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where to buy an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl BuyReference {
    pub fn is_empty(&self) -> bool {
        self.place.is_none() && self.url.is_none()
    }
}

/// A tracked consumable, as loaded from the inventory store.
///
/// Built fresh on every load and never mutated afterwards. Invariants hold by
/// construction (see [`ItemBuilder::build`]):
/// - `quantity_remaining` is finite and `>= 0`
/// - consumption rates, `min_order_qty` and `pack_size` are `None` or finite and `> 0`
/// - `lead_time_days` and `safety_stock_days` are finite and `>= 0`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    id: ItemId,
    name: String,
    brand: Option<String>,
    unit: Unit,
    quantity_remaining: f64,
    avg_daily_consumption: Option<f64>,
    avg_monthly_consumption: Option<f64>,
    last_replenished_at: Option<DateTime<Utc>>,
    auto_subscription_active: bool,
    buy_reference: Option<BuyReference>,
    lead_time_days: f64,
    safety_stock_days: f64,
    min_order_qty: Option<f64>,
    pack_size: Option<f64>,
}

impl Item {
    pub fn builder(id: ItemId, name: impl Into<String>, unit: Unit, quantity_remaining: f64) -> ItemBuilder {
        ItemBuilder::new(id, name, unit, quantity_remaining)
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn quantity_remaining(&self) -> f64 {
        self.quantity_remaining
    }

    pub fn avg_daily_consumption(&self) -> Option<f64> {
        self.avg_daily_consumption
    }

    pub fn avg_monthly_consumption(&self) -> Option<f64> {
        self.avg_monthly_consumption
    }

    pub fn last_replenished_at(&self) -> Option<DateTime<Utc>> {
        self.last_replenished_at
    }

    pub fn auto_subscription_active(&self) -> bool {
        self.auto_subscription_active
    }

    pub fn buy_reference(&self) -> Option<&BuyReference> {
        self.buy_reference.as_ref()
    }

    pub fn lead_time_days(&self) -> f64 {
        self.lead_time_days
    }

    pub fn safety_stock_days(&self) -> f64 {
        self.safety_stock_days
    }

    pub fn min_order_qty(&self) -> Option<f64> {
        self.min_order_qty
    }

    pub fn pack_size(&self) -> Option<f64> {
        self.pack_size
    }

    /// Copy of this item with a new stock level (clamped at zero).
    pub fn with_quantity_remaining(&self, quantity: f64) -> Item {
        Item {
            quantity_remaining: if quantity.is_finite() { quantity.max(0.0) } else { self.quantity_remaining },
            ..self.clone()
        }
    }

    /// Lead time plus safety stock: the per-item target window.
    pub fn default_target_window_days(&self) -> f64 {
        self.lead_time_days + self.safety_stock_days
    }
}

/// Builder for [`Item`].
///
/// Structural fields (id, name, unit, quantity) are mandatory. Optional tuning
/// parameters are normalised: a non-positive rate/size means "not set", a
/// negative lead/safety time is clamped to zero.
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    id: ItemId,
    name: String,
    brand: Option<String>,
    unit: Unit,
    quantity_remaining: f64,
    avg_daily_consumption: Option<f64>,
    avg_monthly_consumption: Option<f64>,
    last_replenished_at: Option<DateTime<Utc>>,
    auto_subscription_active: bool,
    buy_reference: Option<BuyReference>,
    lead_time_days: f64,
    safety_stock_days: f64,
    min_order_qty: Option<f64>,
    pack_size: Option<f64>,
}

impl ItemBuilder {
    pub fn new(id: ItemId, name: impl Into<String>, unit: Unit, quantity_remaining: f64) -> Self {
        Self {
            id,
            name: name.into(),
            brand: None,
            unit,
            quantity_remaining,
            avg_daily_consumption: None,
            avg_monthly_consumption: None,
            last_replenished_at: None,
            auto_subscription_active: false,
            buy_reference: None,
            lead_time_days: DEFAULT_LEAD_TIME_DAYS,
            safety_stock_days: DEFAULT_SAFETY_STOCK_DAYS,
            min_order_qty: None,
            pack_size: None,
        }
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn daily_consumption(mut self, rate: f64) -> Self {
        self.avg_daily_consumption = Some(rate);
        self
    }

    pub fn monthly_consumption(mut self, rate: f64) -> Self {
        self.avg_monthly_consumption = Some(rate);
        self
    }

    pub fn last_replenished_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_replenished_at = Some(at);
        self
    }

    pub fn auto_subscription(mut self, active: bool) -> Self {
        self.auto_subscription_active = active;
        self
    }

    pub fn buy_reference(mut self, reference: BuyReference) -> Self {
        self.buy_reference = Some(reference);
        self
    }

    pub fn lead_time_days(mut self, days: f64) -> Self {
        self.lead_time_days = days;
        self
    }

    pub fn safety_stock_days(mut self, days: f64) -> Self {
        self.safety_stock_days = days;
        self
    }

    pub fn min_order_qty(mut self, qty: f64) -> Self {
        self.min_order_qty = Some(qty);
        self
    }

    pub fn pack_size(mut self, size: f64) -> Self {
        self.pack_size = Some(size);
        self
    }

    pub fn build(self) -> DomainResult<Item> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if !self.quantity_remaining.is_finite() {
            return Err(DomainError::validation("quantityRemaining must be a finite number"));
        }

        Ok(Item {
            id: self.id,
            name,
            brand: self.brand.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
            unit: self.unit,
            quantity_remaining: self.quantity_remaining.max(0.0),
            avg_daily_consumption: positive(self.avg_daily_consumption),
            avg_monthly_consumption: positive(self.avg_monthly_consumption),
            last_replenished_at: self.last_replenished_at,
            auto_subscription_active: self.auto_subscription_active,
            buy_reference: self.buy_reference.filter(|r| !r.is_empty()),
            lead_time_days: non_negative(self.lead_time_days, DEFAULT_LEAD_TIME_DAYS),
            safety_stock_days: non_negative(self.safety_stock_days, DEFAULT_SAFETY_STOCK_DAYS),
            min_order_qty: positive(self.min_order_qty),
            pack_size: positive(self.pack_size),
        })
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn non_negative(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ItemId {
        ItemId::new(s).unwrap()
    }

    #[test]
    fn builder_applies_defaults() {
        let item = Item::builder(id("soap"), "Hand soap", Unit::VolumeMl, 250.0)
            .build()
            .unwrap();

        assert_eq!(item.lead_time_days(), 2.0);
        assert_eq!(item.safety_stock_days(), 3.0);
        assert_eq!(item.default_target_window_days(), 5.0);
        assert!(!item.auto_subscription_active());
        assert!(item.pack_size().is_none());
    }

    #[test]
    fn builder_rejects_blank_name_and_nan_quantity() {
        assert!(Item::builder(id("x"), "  ", Unit::Count, 1.0).build().is_err());
        assert!(Item::builder(id("x"), "X", Unit::Count, f64::NAN).build().is_err());
    }

    #[test]
    fn builder_normalises_optional_parameters() {
        let item = Item::builder(id("x"), "X", Unit::MassG, -4.0)
            .daily_consumption(0.0)
            .monthly_consumption(-1.0)
            .pack_size(0.0)
            .min_order_qty(f64::INFINITY)
            .lead_time_days(-1.0)
            .safety_stock_days(f64::NAN)
            .brand("   ")
            .buy_reference(BuyReference::default())
            .build()
            .unwrap();

        assert_eq!(item.quantity_remaining(), 0.0);
        assert!(item.avg_daily_consumption().is_none());
        assert!(item.avg_monthly_consumption().is_none());
        assert!(item.pack_size().is_none());
        assert!(item.min_order_qty().is_none());
        assert_eq!(item.lead_time_days(), 0.0);
        assert_eq!(item.safety_stock_days(), DEFAULT_SAFETY_STOCK_DAYS);
        assert!(item.brand().is_none());
        assert!(item.buy_reference().is_none());
    }

    #[test]
    fn unit_parses_aliases() {
        assert_eq!("volume-ml".parse::<Unit>().unwrap(), Unit::VolumeMl);
        assert_eq!("G".parse::<Unit>().unwrap(), Unit::MassG);
        assert_eq!("count".parse::<Unit>().unwrap(), Unit::Count);
        assert!("litre".parse::<Unit>().is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_param() -> impl Strategy<Value = f64> {
            prop_oneof![
                -1_000.0f64..1_000.0,
                Just(0.0),
                Just(f64::NAN),
                Just(f64::INFINITY),
                Just(f64::NEG_INFINITY),
            ]
        }

        proptest! {
            /// Property: whatever the store hands us, built items satisfy the invariants.
            #[test]
            fn built_items_satisfy_invariants(
                qty in -1_000.0f64..1_000.0,
                daily in any_param(),
                monthly in any_param(),
                lead in any_param(),
                safety in any_param(),
                min in any_param(),
                pack in any_param(),
            ) {
                let item = Item::builder(id("p"), "P", Unit::Count, qty)
                    .daily_consumption(daily)
                    .monthly_consumption(monthly)
                    .lead_time_days(lead)
                    .safety_stock_days(safety)
                    .min_order_qty(min)
                    .pack_size(pack)
                    .build()
                    .unwrap();

                prop_assert!(item.quantity_remaining() >= 0.0);
                prop_assert!(item.lead_time_days().is_finite() && item.lead_time_days() >= 0.0);
                prop_assert!(item.safety_stock_days().is_finite() && item.safety_stock_days() >= 0.0);
                for v in [
                    item.avg_daily_consumption(),
                    item.avg_monthly_consumption(),
                    item.min_order_qty(),
                    item.pack_size(),
                ]
                .into_iter()
                .flatten()
                {
                    prop_assert!(v.is_finite() && v > 0.0);
                }
            }
        }
    }
}
