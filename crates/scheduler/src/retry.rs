//! The generate-validate-retry state machine.
//!
//! ```text
//! Attempting(0) ──valid──▶ Succeeded
//!      │
//!   invalid / transport error
//!      ▼
//! Attempting(1) ──valid──▶ Succeeded
//!      │
//!      ▼
//!     ...      last permitted attempt fails ──▶ Failed
//! ```
//!
//! `max_retries` bounds the total number of completion calls, the first
//! attempt included. Every attempt after the first carries the latest
//! violation list back to the model as corrective feedback.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use plansmith_config::GenerationConfig;
use plansmith_core::error::ProviderError;
use plansmith_core::memory::DocumentIndex;
use plansmith_core::provider::Provider;
use plansmith_core::schedule::DateSchedule;
use tracing::{error, info, warn};

use crate::completion::CompletionClient;
use crate::prompt::compose;
use crate::retriever::ContextRetriever;
use crate::validator::{ValidationErrors, validate};

/// Where the controller is in one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Issuing the zero-based attempt `i`
    Attempting(u32),
    Succeeded,
    Failed,
}

/// What happened on one attempt.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Valid,
    Invalid(ValidationErrors),
    Transport(ProviderError),
}

/// Record of one completion call. Lives only as long as the run's outcome.
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    /// Zero-based attempt index
    pub index: u32,
    pub temperature: f32,
    pub prompt: String,
    /// Model output, absent when the call itself failed
    pub raw_output: Option<String>,
    pub outcome: AttemptOutcome,
}

/// Why a run ended in `Failed`.
#[derive(Debug, Clone)]
pub enum FailureReason {
    Validation(ValidationErrors),
    Transport(ProviderError),
}

impl FailureReason {
    /// The diagnostic text carried to the caller.
    pub fn detail(&self) -> String {
        match self {
            Self::Validation(errors) => errors.feedback(),
            Self::Transport(e) => e.to_string(),
        }
    }
}

/// Terminal result of a run. Failure is a value, never an `Err`.
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    Succeeded {
        schedule: DateSchedule,
        attempts: Vec<GenerationAttempt>,
    },
    Failed {
        reason: FailureReason,
        attempts: Vec<GenerationAttempt>,
    },
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn attempts(&self) -> &[GenerationAttempt] {
        match self {
            Self::Succeeded { attempts, .. } | Self::Failed { attempts, .. } => attempts,
        }
    }

    pub fn schedule(&self) -> Option<&DateSchedule> {
        match self {
            Self::Succeeded { schedule, .. } => Some(schedule),
            Self::Failed { .. } => None,
        }
    }

    /// Caller-facing description of a failed run; `None` on success.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Failed { reason, attempts } => Some(format!(
                "Failed to generate valid schedule after {} attempts. Last error: {}",
                attempts.len(),
                reason.detail()
            )),
        }
    }
}

/// Drives retrieval, composition, completion, and validation for one
/// request at a time. Holds no per-request state, so one controller can
/// serve concurrent runs.
pub struct RetryController {
    retriever: ContextRetriever,
    client: CompletionClient,
    max_retries: u32,
    top_k: usize,
    now: Option<NaiveDateTime>,
}

impl RetryController {
    pub fn new(retriever: ContextRetriever, client: CompletionClient) -> Self {
        Self {
            retriever,
            client,
            max_retries: 3,
            top_k: 5,
            now: None,
        }
    }

    /// Build a controller from the generation settings.
    pub fn from_config(
        config: &GenerationConfig,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        index: Arc<dyn DocumentIndex>,
        timeout: Duration,
    ) -> Self {
        let retriever =
            ContextRetriever::new(index, config.relevance_threshold).with_timeout(timeout);
        let client = CompletionClient::new(provider, model)
            .with_temperatures(config.first_attempt_temperature, config.retry_temperature)
            .with_timeout(timeout);

        Self::new(retriever, client)
            .with_max_retries(config.max_retries)
            .with_top_k(config.top_k)
    }

    /// Total completion calls allowed per run (at least one).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Pin the clock used to anchor relative dates in the prompt.
    pub fn with_clock(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run the state machine to a terminal state.
    pub async fn run(&self, user_prompt: &str) -> GenerationOutcome {
        let now = self.now.unwrap_or_else(|| Local::now().naive_local());
        let context = self.retriever.context_for(user_prompt, self.top_k).await;

        let mut attempts: Vec<GenerationAttempt> = Vec::new();
        let mut last_violations: Option<ValidationErrors> = None;
        let mut last_failure: Option<FailureReason> = None;
        let mut state = AttemptState::Attempting(0);

        loop {
            let i = match state {
                AttemptState::Attempting(i) => i,
                AttemptState::Succeeded | AttemptState::Failed => break,
            };

            info!(attempt = i + 1, max = self.max_retries, "Generating schedule");

            let feedback = last_violations
                .as_ref()
                .map(ValidationErrors::feedback)
                .unwrap_or_default();
            let prompt = compose(user_prompt, &context, &feedback, now);
            let temperature = self.client.temperature_for(i);

            let (raw_output, outcome) = match self.client.complete(&prompt, temperature).await {
                Ok(raw) => match validate(&raw) {
                    Ok(schedule) => {
                        info!(
                            attempt = i + 1,
                            days = schedule.len(),
                            tasks = schedule.total_tasks(),
                            "Schedule validation successful"
                        );
                        attempts.push(GenerationAttempt {
                            index: i,
                            temperature,
                            prompt,
                            raw_output: Some(raw),
                            outcome: AttemptOutcome::Valid,
                        });
                        return GenerationOutcome::Succeeded { schedule, attempts };
                    }
                    Err(errors) => {
                        warn!(
                            attempt = i + 1,
                            violations = errors.len(),
                            "Validation failed: {errors}"
                        );
                        last_violations = Some(errors.clone());
                        last_failure = Some(FailureReason::Validation(errors.clone()));
                        (Some(raw), AttemptOutcome::Invalid(errors))
                    }
                },
                Err(e) => {
                    error!(attempt = i + 1, error = %e, "Completion call failed");
                    last_failure = Some(FailureReason::Transport(e.clone()));
                    (None, AttemptOutcome::Transport(e))
                }
            };

            attempts.push(GenerationAttempt {
                index: i,
                temperature,
                prompt,
                raw_output,
                outcome,
            });

            state = next_state(i, self.max_retries);
        }

        let reason = last_failure.unwrap_or_else(|| {
            FailureReason::Transport(ProviderError::NotConfigured("no attempts were made".into()))
        });
        warn!(attempts = attempts.len(), "Giving up on schedule generation");
        GenerationOutcome::Failed { reason, attempts }
    }
}

/// Transition after a failed attempt `i`.
fn next_state(i: u32, max_retries: u32) -> AttemptState {
    if i + 1 < max_retries {
        AttemptState::Attempting(i + 1)
    } else {
        AttemptState::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::validator::ViolationKind;
    use chrono::NaiveDate;
    use plansmith_core::memory::Passage;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 13)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn controller(provider: Arc<SequentialMockProvider>, max_retries: u32) -> RetryController {
        let retriever = ContextRetriever::new(Arc::new(StaticIndex::new(vec![])), 1.0);
        let client = CompletionClient::new(provider, "mock-model");
        RetryController::new(retriever, client)
            .with_max_retries(max_retries)
            .with_clock(fixed_now())
    }

    #[test]
    fn transitions() {
        assert_eq!(next_state(0, 3), AttemptState::Attempting(1));
        assert_eq!(next_state(1, 3), AttemptState::Attempting(2));
        assert_eq!(next_state(2, 3), AttemptState::Failed);
        assert_eq!(next_state(0, 1), AttemptState::Failed);
    }

    #[tokio::test]
    async fn succeeds_on_first_valid_output() {
        let provider = Arc::new(SequentialMockProvider::texts(&[VALID_SCHEDULE]));
        let outcome = controller(provider.clone(), 3).run("Study math").await;

        assert!(outcome.is_success());
        assert_eq!(provider.call_count(), 1);
        assert_eq!(outcome.attempts().len(), 1);
        assert!(outcome.failure_message().is_none());
        assert_eq!(outcome.schedule().unwrap().total_tasks(), 1);
    }

    #[tokio::test]
    async fn always_invalid_makes_exactly_max_calls() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "not json", "not json", "not json",
        ]));
        let outcome = controller(provider.clone(), 3).run("Study math").await;

        // A fourth call would panic inside the mock.
        assert_eq!(provider.call_count(), 3);
        let GenerationOutcome::Failed { reason, attempts } = &outcome else {
            panic!("expected failure");
        };
        assert_eq!(attempts.len(), 3);
        let FailureReason::Validation(errors) = reason else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.violations()[0].kind, ViolationKind::MalformedOutput);

        let message = outcome.failure_message().unwrap();
        assert!(message
            .starts_with("Failed to generate valid schedule after 3 attempts. Last error: "));
        assert!(message.contains("Invalid JSON format"));
    }

    #[tokio::test]
    async fn succeeds_on_second_attempt_without_third_call() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            OVERLAPPING_SCHEDULE,
            VALID_SCHEDULE,
        ]));
        let outcome = controller(provider.clone(), 3).run("Study math").await;

        assert!(outcome.is_success());
        assert_eq!(provider.call_count(), 2);
        assert!(matches!(outcome.attempts()[0].outcome, AttemptOutcome::Invalid(_)));
        assert!(matches!(outcome.attempts()[1].outcome, AttemptOutcome::Valid));
    }

    #[tokio::test]
    async fn retries_carry_feedback_and_lower_temperature() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            OVERLAPPING_SCHEDULE,
            VALID_SCHEDULE,
        ]));
        controller(provider.clone(), 3).run("Study math").await;

        let requests = provider.requests();
        assert_eq!(requests[0].temperature, 0.7);
        assert_eq!(requests[1].temperature, 0.5);
        assert!(requests.iter().all(|r| r.json_mode));

        let first = &requests[0].messages[0].content;
        let second = &requests[1].messages[0].content;
        assert!(!first.contains("PREVIOUS ATTEMPT"));
        assert!(second.contains("PREVIOUS ATTEMPT FAILED VALIDATION"));
        assert!(second.contains(
            "Task overlap detected on 7/14/2025: \
             'Math' ends at 10:00 AM and 'Physics' starts at 09:30 AM"
        ));
    }

    #[tokio::test]
    async fn transport_error_consumes_an_attempt() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            Err(ProviderError::Network("connection reset".into())),
            Ok(make_text_response(VALID_SCHEDULE)),
        ]));
        let outcome = controller(provider.clone(), 3).run("Study math").await;

        assert!(outcome.is_success());
        assert_eq!(provider.call_count(), 2);
        let first = &outcome.attempts()[0];
        assert!(first.raw_output.is_none());
        assert!(matches!(first.outcome, AttemptOutcome::Transport(ProviderError::Network(_))));
        // Nothing to correct after a transport failure.
        assert!(!provider.requests()[1].messages[0].content.contains("PREVIOUS ATTEMPT"));
    }

    #[tokio::test]
    async fn transport_error_on_final_attempt_fails() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            Ok(make_text_response("[]")),
            Err(ProviderError::EmptyResponse),
        ]));
        let outcome = controller(provider.clone(), 2).run("Study math").await;

        assert_eq!(provider.call_count(), 2);
        let GenerationOutcome::Failed { reason, .. } = &outcome else {
            panic!("expected failure");
        };
        assert!(matches!(reason, FailureReason::Transport(ProviderError::EmptyResponse)));
        assert_eq!(
            outcome.failure_message().unwrap(),
            "Failed to generate valid schedule after 2 attempts. \
             Last error: Provider returned an empty response"
        );
    }

    #[tokio::test]
    async fn single_attempt_budget() {
        let provider = Arc::new(SequentialMockProvider::texts(&["{}"]));
        let outcome = controller(provider.clone(), 1).run("Study math").await;
        assert!(!outcome.is_success());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn zero_budget_is_clamped_to_one() {
        let provider = Arc::new(SequentialMockProvider::texts(&[VALID_SCHEDULE]));
        let c = controller(provider.clone(), 0);
        assert_eq!(c.max_retries(), 1);
        assert!(c.run("Study math").await.is_success());
    }

    #[tokio::test]
    async fn retrieved_context_reaches_every_prompt() {
        let provider = Arc::new(SequentialMockProvider::texts(&["nope", VALID_SCHEDULE]));
        let index = Arc::new(StaticIndex::new(vec![
            Passage::new("Chemistry lab Thursdays 1-3 PM", 0.4),
            Passage::new("Unrelated grocery list", 1.7),
        ]));
        let controller = RetryController::new(
            ContextRetriever::new(index, 1.0),
            CompletionClient::new(provider.clone(), "mock-model"),
        )
        .with_clock(fixed_now());

        controller.run("When is chemistry lab?").await;

        for request in provider.requests() {
            let prompt = &request.messages[0].content;
            assert!(prompt.contains("Chemistry lab Thursdays 1-3 PM"));
            assert!(!prompt.contains("grocery"));
            assert!(prompt.contains("Today is 07/13/2025 (Sunday)"));
        }
    }

    #[tokio::test]
    async fn from_config_applies_settings() {
        let config = GenerationConfig {
            max_retries: 2,
            first_attempt_temperature: 0.9,
            retry_temperature: 0.1,
            ..GenerationConfig::default()
        };
        let provider = Arc::new(SequentialMockProvider::texts(&["x", "y"]));
        let controller = RetryController::from_config(
            &config,
            provider.clone(),
            "gpt-test",
            Arc::new(StaticIndex::new(vec![])),
            Duration::from_secs(5),
        );

        assert_eq!(controller.max_retries(), 2);
        controller.run("anything").await;
        let temps: Vec<f32> = provider.requests().iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![0.9, 0.1]);
        assert_eq!(provider.requests()[0].model, "gpt-test");
    }
}
