//! In-memory store, useful for tests and `--dry-run` sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use plansmith_core::error::StoreError;
use plansmith_core::schedule::WeekdaySchedule;
use plansmith_core::store::{SavedSchedule, ScheduleStore, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct StoredSchedule {
    schedule: WeekdaySchedule,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: Vec<String>,
    schedules: HashMap<UserId, StoredSchedule>,
}

/// A store that keeps users and schedules in process memory.
///
/// User IDs start at 1 and follow creation order.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        let users = self.state.read().await.users.len() as UserId;
        Ok((1..=users).contains(&user_id))
    }

    async fn create_user(&self, username: &str) -> Result<UserId, StoreError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u == username) {
            return Err(StoreError::Storage(format!("Username '{username}' is taken")));
        }
        state.users.push(username.to_string());
        Ok(state.users.len() as UserId)
    }

    async fn save_schedule(
        &self,
        user_id: UserId,
        schedule: &WeekdaySchedule,
    ) -> Result<SavedSchedule, StoreError> {
        if !self.user_exists(user_id).await? {
            return Err(StoreError::UserNotFound(user_id));
        }

        let now = Utc::now();
        let mut state = self.state.write().await;
        let entry = state.schedules.entry(user_id).or_insert_with(|| StoredSchedule {
            schedule: WeekdaySchedule::default(),
            created_at: now,
            updated_at: now,
        });
        entry.schedule = schedule.clone();
        entry.updated_at = now;

        Ok(SavedSchedule {
            user_id,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        })
    }

    async fn load_schedule(&self, user_id: UserId) -> Result<Option<WeekdaySchedule>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .schedules
            .get(&user_id)
            .map(|s| s.schedule.clone()))
    }
}
