//! Completion client: one prompt in, raw text or a transport error out.
//!
//! The only policy owned here is temperature selection: the first attempt
//! runs warmer for coverage, corrective retries run cooler for format
//! compliance.

use std::sync::Arc;
use std::time::Duration;

use plansmith_core::error::ProviderError;
use plansmith_core::message::Message;
use plansmith_core::provider::{Provider, ProviderRequest};
use tracing::debug;

pub struct CompletionClient {
    provider: Arc<dyn Provider>,
    model: String,
    first_attempt_temperature: f32,
    retry_temperature: f32,
    timeout: Duration,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            first_attempt_temperature: 0.7,
            retry_temperature: 0.5,
            timeout: Duration::from_secs(120),
        }
    }

    /// Set the first-attempt and retry temperatures.
    pub fn with_temperatures(mut self, first_attempt: f32, retry: f32) -> Self {
        self.first_attempt_temperature = first_attempt;
        self.retry_temperature = retry;
        self
    }

    /// Set the per-call timeout. An elapsed timeout is a transport error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Temperature for a zero-based attempt index.
    pub fn temperature_for(&self, attempt: u32) -> f32 {
        if attempt == 0 {
            self.first_attempt_temperature
        } else {
            self.retry_temperature
        }
    }

    /// Send `prompt` in JSON mode and return the raw text.
    ///
    /// Missing or blank content is reported as [`ProviderError::EmptyResponse`].
    pub async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            temperature,
            max_tokens: None,
            json_mode: true,
        };

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            temperature,
            prompt_chars = prompt.len(),
            "Sending completion request"
        );

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!("no response within {}s", self.timeout.as_secs()))
            })??;

        let content = response.message.content;
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{SequentialMockProvider, SlowProvider};

    #[test]
    fn first_attempt_is_warmer() {
        let client =
            CompletionClient::new(Arc::new(SequentialMockProvider::texts(&[])), "gpt-test");
        assert_eq!(client.temperature_for(0), 0.7);
        assert_eq!(client.temperature_for(1), 0.5);
        assert_eq!(client.temperature_for(2), 0.5);
    }

    #[tokio::test]
    async fn sends_json_mode_request() {
        let provider = Arc::new(SequentialMockProvider::texts(&["{}"]));
        let client =
            CompletionClient::new(provider.clone(), "gpt-test").with_temperatures(0.9, 0.2);

        let text = client.complete("plan my day", 0.9).await.unwrap();
        assert_eq!(text, "{}");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].json_mode);
        assert_eq!(requests[0].model, "gpt-test");
        assert_eq!(requests[0].temperature, 0.9);
        assert_eq!(requests[0].messages[0].content, "plan my day");
    }

    #[tokio::test]
    async fn blank_content_is_a_transport_error() {
        let client = CompletionClient::new(Arc::new(SequentialMockProvider::texts(&["   "])), "m");
        let err = client.complete("p", 0.7).await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let provider = SequentialMockProvider::new(vec![Err(ProviderError::Network(
            "connection reset".into(),
        ))]);
        let client = CompletionClient::new(Arc::new(provider), "m");
        let err = client.complete("p", 0.7).await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let client = CompletionClient::new(Arc::new(SlowProvider(Duration::from_secs(300))), "m")
            .with_timeout(Duration::from_secs(5));
        let err = client.complete("p", 0.7).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }
}
