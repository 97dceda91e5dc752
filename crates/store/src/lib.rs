//! Persistence for Plansmith users and their weekly schedules.

pub mod in_memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryScheduleStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteScheduleStore;
