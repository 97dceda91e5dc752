//! Schedule store trait — the persistence collaborator.
//!
//! The generation pipeline hands a finished [`WeekdaySchedule`] to the store
//! only after validation and normalization succeed. One schedule is kept per
//! user; saving again replaces it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::StoreError;
use crate::schedule::WeekdaySchedule;

/// Numeric account identifier.
pub type UserId = i64;

/// Timestamps reported back after a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSchedule {
    pub user_id: UserId,

    /// When the user's schedule was first stored
    pub created_at: DateTime<Utc>,

    /// When it was last replaced
    pub updated_at: DateTime<Utc>,
}

/// The core ScheduleStore trait.
///
/// Implementations: SQLite, in-memory (for testing).
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Whether an account with this ID exists.
    async fn user_exists(&self, user_id: UserId) -> std::result::Result<bool, StoreError>;

    /// Create an account and return its ID.
    async fn create_user(&self, username: &str) -> std::result::Result<UserId, StoreError>;

    /// Store (or replace) the user's weekly schedule.
    async fn save_schedule(
        &self,
        user_id: UserId,
        schedule: &WeekdaySchedule,
    ) -> std::result::Result<SavedSchedule, StoreError>;

    /// Fetch the user's stored schedule, if any.
    async fn load_schedule(
        &self,
        user_id: UserId,
    ) -> std::result::Result<Option<WeekdaySchedule>, StoreError>;
}
