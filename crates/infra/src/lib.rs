//! Infrastructure layer: collaborator ports, adapters, and the replenishment use case.

pub mod clock;
pub mod inventory;
pub mod notify;
pub mod ports;
pub mod replenishment;
pub mod runner;

pub use clock::{FixedClock, SystemClock};
pub use ports::{
    AdapterError, AdapterErrorKind, Clock, Collaborator, InventorySource, NotificationMessage,
    NotificationSink, SaveOptions,
};
pub use inventory::{InMemoryInventory, JsonFileInventory};
pub use notify::{InMemoryNotificationSink, LogNotificationSink};
pub use replenishment::{CheckError, CheckSummary, NotificationOptions, ReplenishmentCheck};
pub use runner::{ScheduledCheck, ScheduledCheckHandle};
