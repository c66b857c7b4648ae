use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use restock_inventory::{Item, ReasonCode};

use crate::decision::Decision;
use crate::params::PolicyParams;

/// Average days per month used to convert monthly consumption to daily.
pub const MONTHLY_TO_DAILY_DIVISOR: f64 = 30.44;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Relative slack when checking whether a quantity is already a pack multiple.
const PACK_EPSILON: f64 = 1e-9;

/// Deterministic replenishment policy.
///
/// Model:
/// - Derive an effective daily rate (daily, else monthly / 30.44).
/// - Optionally project stock forward from the last replenishment.
/// - Reorder when days of stock left fall within the target window
///   (override, else lead time + safety stock), buying enough to also cover
///   the review horizon, respecting minimum order and pack size.
///
/// Every item yields exactly one decision; evaluation cannot fail.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    params: PolicyParams,
}

impl DecisionEngine {
    pub fn new(params: PolicyParams) -> Self {
        Self { params }
    }

    pub fn evaluate(&self, item: &Item, now: DateTime<Utc>) -> Decision {
        let daily = effective_daily_consumption(item);

        let days_since = item.last_replenished_at().map(|at| days_between(at, now));
        let current_stock = match (self.params.project_consumption, days_since, daily) {
            (true, Some(elapsed), Some(rate)) => {
                (item.quantity_remaining() - rate * elapsed.max(0.0)).max(0.0)
            }
            _ => item.quantity_remaining(),
        };

        let base = Decision {
            needs_replenishment: false,
            recommended_order_qty: None,
            replenish_by_date: None,
            reason_code: ReasonCode::SufficientStock,
            days_until_depletion: None,
            current_stock,
            days_since_replenishment: days_since,
            effective_daily_consumption: daily,
            target_window_days: None,
        };

        if item.auto_subscription_active() {
            return Decision {
                reason_code: ReasonCode::AutoSubscriptionActive,
                days_until_depletion: daily.map(|rate| current_stock / rate),
                ..base
            };
        }

        let Some(rate) = daily else {
            if current_stock <= 0.0 {
                let floor = item.min_order_qty().or(item.pack_size()).unwrap_or(1.0).max(1.0);
                return Decision {
                    needs_replenishment: true,
                    reason_code: ReasonCode::DepletedOrInvalid,
                    recommended_order_qty: Some(round_to_pack(floor, item.pack_size())),
                    ..base
                };
            }
            return Decision {
                reason_code: ReasonCode::InsufficientConsumptionData,
                ..base
            };
        };

        let days_left = current_stock / rate;
        let window = self
            .params
            .target_window_override
            .unwrap_or_else(|| item.default_target_window_days());

        if days_left > window {
            return Decision {
                days_until_depletion: Some(days_left),
                target_window_days: Some(window),
                ..base
            };
        }

        let coverage_days = window + self.params.review_horizon_days;
        let raw_qty = (coverage_days * rate - current_stock).max(0.0).ceil();
        let qty = raw_qty.max(item.min_order_qty().unwrap_or(1.0));

        Decision {
            needs_replenishment: true,
            reason_code: ReasonCode::WithinTargetWindow,
            recommended_order_qty: Some(round_to_pack(qty, item.pack_size())),
            replenish_by_date: date_after(now, (days_left - item.lead_time_days()).max(0.0)),
            days_until_depletion: Some(days_left),
            target_window_days: Some(window),
            ..base
        }
    }

    /// Evaluate a batch. Items are independent; output order follows input order.
    pub fn evaluate_all(&self, items: &[Item], now: DateTime<Utc>) -> Vec<Decision> {
        items.iter().map(|item| self.evaluate(item, now)).collect()
    }
}

/// Daily rate if positive, else monthly rate / 30.44 if positive, else none.
pub fn effective_daily_consumption(item: &Item) -> Option<f64> {
    item.avg_daily_consumption()
        .filter(|d| *d > 0.0)
        .or_else(|| {
            item.avg_monthly_consumption()
                .filter(|m| *m > 0.0)
                .map(|m| m / MONTHLY_TO_DAILY_DIVISOR)
        })
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_DAY
}

/// Round `qty` up to a multiple of `pack` when the pack holds more than one unit.
fn round_to_pack(qty: f64, pack: Option<f64>) -> f64 {
    match pack {
        Some(p) if p > 1.0 => {
            let mut packs = (qty / p - PACK_EPSILON).ceil().max(1.0);
            // The slack must never round below the quantity asked for.
            if packs * p < qty {
                packs += 1.0;
            }
            packs * p
        }
        _ => qty,
    }
}

/// Calendar date (UTC) of `now + days`; `None` if that falls outside the representable range.
fn date_after(now: DateTime<Utc>, days: f64) -> Option<NaiveDate> {
    let ms = (days * MS_PER_DAY).round();
    if !ms.is_finite() || ms > i64::MAX as f64 {
        return None;
    }
    let delta = TimeDelta::try_milliseconds(ms as i64)?;
    now.checked_add_signed(delta).map(|at| at.date_naive())
}
