//! Provider construction from configuration.

use std::sync::Arc;
use std::time::Duration;

use plansmith_config::AppConfig;
use plansmith_core::provider::Provider;

use crate::openai_compat::OpenAiCompatProvider;

/// Build the configured completion/embedding provider.
///
/// The provider name is derived from the endpoint host so log lines read
/// `provider=openai`, `provider=ollama`, and so on.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Provider> {
    let api_key = config.api_key.clone().unwrap_or_default();
    Arc::new(OpenAiCompatProvider::with_timeout(
        provider_name(&config.api_url),
        &config.api_url,
        api_key,
        Duration::from_secs(config.request_timeout_secs),
    ))
}

/// Guess a short provider name from a base URL.
fn provider_name(base_url: &str) -> &'static str {
    if base_url.contains("api.openai.com") {
        "openai"
    } else if base_url.contains("openrouter.ai") {
        "openrouter"
    } else if base_url.contains(":11434") {
        "ollama"
    } else {
        "custom"
    }
}
