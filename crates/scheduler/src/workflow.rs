//! End-to-end workflow: generate, normalize, persist.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use plansmith_core::schedule::{DateSchedule, WeekdaySchedule};
use plansmith_core::store::{ScheduleStore, UserId};
use serde::Serialize;
use tracing::{error, info};

use crate::normalize::normalize;
use crate::retry::{GenerationOutcome, RetryController};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Error,
}

/// What the caller gets back from [`ScheduleWorkflow::generate_and_save`].
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub status: ReportStatus,
    pub message: String,
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_data: Option<WeekdaySchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_schedule: Option<DateSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkflowReport {
    fn error(user_id: UserId, message: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Error,
            message: message.into(),
            user_id,
            schedule_data: None,
            original_schedule: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReportStatus::Success
    }
}

/// Ties the retry controller to the schedule store.
pub struct ScheduleWorkflow {
    controller: RetryController,
    store: Arc<dyn ScheduleStore>,
}

impl ScheduleWorkflow {
    pub fn new(controller: RetryController, store: Arc<dyn ScheduleStore>) -> Self {
        Self { controller, store }
    }

    /// Generate a schedule for `user_prompt` and store it for `user_id`.
    ///
    /// Every failure is reported through the returned report.
    pub async fn generate_and_save(&self, user_prompt: &str, user_id: UserId) -> WorkflowReport {
        info!(user_id, "Starting schedule workflow");

        let outcome = self.controller.run(user_prompt).await;
        let schedule = match outcome {
            GenerationOutcome::Succeeded { schedule, .. } => schedule,
            failed @ GenerationOutcome::Failed { .. } => {
                let reason = failed.failure_message().unwrap_or_default();
                error!(user_id, "Schedule generation failed: {reason}");
                return WorkflowReport::error(
                    user_id,
                    format!("Failed to generate schedule: {reason}"),
                );
            }
        };

        let weekly = normalize(&schedule);

        match self.store.user_exists(user_id).await {
            Ok(true) => {}
            Ok(false) => {
                error!(user_id, "User does not exist");
                return WorkflowReport::error(user_id, "User not found");
            }
            Err(e) => {
                error!(user_id, error = %e, "User lookup failed");
                return WorkflowReport::error(user_id, format!("Failed to save schedule: {e}"));
            }
        }

        match self.store.save_schedule(user_id, &weekly).await {
            Ok(saved) => {
                info!(
                    user_id,
                    tasks = weekly.total_tasks(),
                    store = self.store.name(),
                    "Schedule saved"
                );
                WorkflowReport {
                    status: ReportStatus::Success,
                    message: "AI schedule generated and saved successfully".into(),
                    user_id,
                    schedule_data: Some(weekly),
                    original_schedule: Some(schedule),
                    created_at: Some(saved.created_at),
                    updated_at: Some(saved.updated_at),
                }
            }
            Err(e) => {
                error!(user_id, error = %e, "Saving schedule failed");
                WorkflowReport::error(user_id, format!("Failed to save schedule: {e}"))
            }
        }
    }
}
