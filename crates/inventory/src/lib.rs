//! Inventory domain module.
//!
//! The tracked consumable (`Item`), the raw store row it is validated from
//! (`ItemRow`), and the derived attributes written back after a check
//! (`ItemUpdate`). Pure data + validation; no IO.

pub mod item;
pub mod row;
pub mod update;

pub use item::{BuyReference, Item, ItemBuilder, Unit};
pub use row::{ItemRow, RowRejection};
pub use update::{DerivedAttributes, ItemUpdate, ReasonCode};
