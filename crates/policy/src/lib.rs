//! `restock-policy`
//!
//! **Responsibility:** the replenishment decision engine.
//!
//! - Resolves request overrides against service defaults into `PolicyParams`.
//! - Maps (item, params, now) to exactly one `Decision`.
//! - Pure and deterministic: no IO, no clock, no shared state.

pub mod decision;
pub mod engine;
pub mod params;

pub use decision::Decision;
pub use engine::{DecisionEngine, MONTHLY_TO_DAILY_DIVISOR, effective_daily_consumption};
pub use params::{DEFAULT_REVIEW_HORIZON_DAYS, PolicyDefaults, PolicyOverrides, PolicyParams};
