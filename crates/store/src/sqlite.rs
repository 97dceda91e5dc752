//! SQLite schedule store.
//!
//! Two tables:
//! - `users` holds account rows keyed by an autoincrement ID
//! - `schedules` holds one JSON weekday schedule per user
//!
//! Saving upserts on `user_id`, so `created_at` survives replacement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use plansmith_core::error::StoreError;
use plansmith_core::schedule::WeekdaySchedule;
use plansmith_core::store::{SavedSchedule, ScheduleStore, UserId};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A SQLite-backed [`ScheduleStore`].
pub struct SqliteScheduleStore {
    pool: SqlitePool,
}

impl SqliteScheduleStore {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        // Every connection to :memory: is a separate database.
        let max_connections = if path.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite schedule store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT UNIQUE NOT NULL,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("users table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schedules (
                user_id        INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                schedule_data  TEXT NOT NULL,
                created_at     TEXT NOT NULL,
                updated_at     TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("schedules table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn parse_timestamp(
        row: &sqlx::sqlite::SqliteRow,
        column: &str,
    ) -> Result<DateTime<Utc>, StoreError> {
        let raw: String = row
            .try_get(column)
            .map_err(|e| StoreError::Storage(format!("{column} column: {e}")))?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Storage(format!("{column} is not a timestamp: {e}")))
    }
}

#[async_trait]
impl ScheduleStore for SqliteScheduleStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("User lookup failed: {e}")))?;
        Ok(row.is_some())
    }

    async fn create_user(&self, username: &str) -> Result<UserId, StoreError> {
        let result = sqlx::query("INSERT INTO users (username, created_at) VALUES (?, ?)")
            .bind(username)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to create user '{username}': {e}")))?;

        let id = result.last_insert_rowid();
        debug!(user_id = id, username, "Created user");
        Ok(id)
    }

    async fn save_schedule(
        &self,
        user_id: UserId,
        schedule: &WeekdaySchedule,
    ) -> Result<SavedSchedule, StoreError> {
        if !self.user_exists(user_id).await? {
            return Err(StoreError::UserNotFound(user_id));
        }

        let data = serde_json::to_string(schedule)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO schedules (user_id, schedule_data, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                schedule_data = excluded.schedule_data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(&data)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("Failed to save schedule: {e}")))?;

        let row = sqlx::query("SELECT created_at, updated_at FROM schedules WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to read back schedule: {e}")))?;

        debug!(user_id, tasks = schedule.total_tasks(), "Saved schedule");
        Ok(SavedSchedule {
            user_id,
            created_at: Self::parse_timestamp(&row, "created_at")?,
            updated_at: Self::parse_timestamp(&row, "updated_at")?,
        })
    }

    async fn load_schedule(&self, user_id: UserId) -> Result<Option<WeekdaySchedule>, StoreError> {
        let row = sqlx::query("SELECT schedule_data FROM schedules WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to load schedule: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let data: String = row
            .try_get("schedule_data")
            .map_err(|e| StoreError::Storage(format!("schedule_data column: {e}")))?;
        let schedule = serde_json::from_str(&data)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Some(schedule))
    }
}
