//! Shared test helpers: scripted providers and fixed indexes.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use plansmith_core::error::{MemoryError, ProviderError};
use plansmith_core::memory::{DocumentIndex, Passage};
use plansmith_core::message::Message;
use plansmith_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};

/// A mock provider that returns a sequence of scripted results.
///
/// Each call to `complete` returns the next result in the queue and
/// records the request. Panics if more calls are made than results provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that answers with each text in turn.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(make_text_response(t))).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let count = requests.len();

        if count >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                count,
                responses.len()
            );
        }

        requests.push(request);
        responses[count].clone()
    }
}

/// A provider that never answers within any reasonable timeout.
pub struct SlowProvider(pub Duration);

#[async_trait]
impl Provider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tokio::time::sleep(self.0).await;
        Ok(make_text_response("{}"))
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// An index that always returns the same passages (truncated to `k`).
pub struct StaticIndex {
    passages: Vec<Passage>,
}

impl StaticIndex {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self { passages }
    }
}

#[async_trait]
impl DocumentIndex for StaticIndex {
    fn name(&self) -> &str {
        "static"
    }

    async fn similarity_search(&self, _query: &str, k: usize) -> Result<Vec<Passage>, MemoryError> {
        Ok(self.passages.iter().take(k).cloned().collect())
    }
}

/// An index whose searches always fail.
pub struct FailingIndex;

#[async_trait]
impl DocumentIndex for FailingIndex {
    fn name(&self) -> &str {
        "failing"
    }

    async fn similarity_search(
        &self,
        _query: &str,
        _k: usize,
    ) -> Result<Vec<Passage>, MemoryError> {
        Err(MemoryError::QueryFailed("index offline".into()))
    }
}

/// A minimal valid schedule with one task on Monday 7/14/2025.
pub const VALID_SCHEDULE: &str = r#"{"7/14/2025": [
    {"task_name": "Math Study", "start_time": "09:00 AM", "end_time": "10:00 AM",
     "priority": true, "recurrence": "DAILY"}
]}"#;

/// A schedule whose two tasks overlap.
pub const OVERLAPPING_SCHEDULE: &str = r#"{"7/14/2025": [
    {"task_name": "Math", "start_time": "09:00 AM", "end_time": "10:00 AM",
     "priority": true, "recurrence": "none"},
    {"task_name": "Physics", "start_time": "09:30 AM", "end_time": "11:00 AM",
     "priority": false, "recurrence": "none"}
]}"#;
