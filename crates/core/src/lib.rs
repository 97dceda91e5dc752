//! # Plansmith Core
//!
//! Domain types, traits, and error definitions for the Plansmith schedule
//! generator. This crate has **zero framework dependencies**. It defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates:
//! - [`Provider`] — LLM completion and embeddings (`plansmith-providers`)
//! - [`DocumentIndex`] — similarity search over ingested documents (`plansmith-memory`)
//! - [`ScheduleStore`] — user lookup and schedule persistence (`plansmith-store`)
//!
//! The generation pipeline in `plansmith-scheduler` depends only on these
//! traits, so every collaborator can be swapped for a scripted mock in tests.

pub mod error;
pub mod memory;
pub mod message;
pub mod provider;
pub mod schedule;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use memory::{Document, DocumentIndex, Passage};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use schedule::{
    DateSchedule, Recurrence, ScheduleDate, ScheduleTime, ScheduledDay, Task, WeekdaySchedule,
};
pub use store::{SavedSchedule, ScheduleStore, UserId};
