//! Inventory source adapters.

pub mod in_memory;
pub mod json_file;

pub use in_memory::{InMemoryInventory, InMemoryRecord};
pub use json_file::JsonFileInventory;
