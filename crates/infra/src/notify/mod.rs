//! Notification sink adapters.

pub mod in_memory;
pub mod log;

pub use self::log::LogNotificationSink;
pub use in_memory::InMemoryNotificationSink;
