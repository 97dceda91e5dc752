//! Context retrieval from the document index.
//!
//! Asks the index for the `k` nearest passages and keeps only those whose
//! distance is strictly below the relevance threshold. Retrieval never fails
//! the pipeline: index errors and timeouts degrade to an empty context.

use std::sync::Arc;
use std::time::Duration;

use plansmith_core::memory::{DocumentIndex, Passage};
use tracing::{debug, info, warn};

/// Default relevance threshold (squared L2 distance).
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 1.0;

/// Retrieves grounding passages for a scheduling request.
pub struct ContextRetriever {
    index: Arc<dyn DocumentIndex>,
    threshold: f32,
    timeout: Duration,
}

impl ContextRetriever {
    pub fn new(index: Arc<dyn DocumentIndex>, threshold: f32) -> Self {
        Self {
            index,
            threshold,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the per-call timeout for the similarity search.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Passages relevant to `query`, in the order the index returned them.
    pub async fn retrieve(&self, query: &str, k: usize) -> Vec<Passage> {
        let search = self.index.similarity_search(query, k);
        let hits = match tokio::time::timeout(self.timeout, search).await {
            Ok(Ok(hits)) => hits,
            Ok(Err(e)) => {
                warn!(
                    index = self.index.name(),
                    error = %e,
                    "Similarity search failed, continuing without context"
                );
                return Vec::new();
            }
            Err(_) => {
                warn!(
                    index = self.index.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "Similarity search timed out, continuing without context"
                );
                return Vec::new();
            }
        };

        let total = hits.len();
        let relevant: Vec<Passage> = hits
            .into_iter()
            .filter(|p| p.distance < self.threshold)
            .collect();

        debug!(
            total,
            relevant = relevant.len(),
            threshold = self.threshold,
            "Filtered retrieved passages"
        );
        if relevant.is_empty() {
            info!("No relevant documents found for context");
        } else {
            info!(chunks = relevant.len(), "Retrieved relevant document chunks");
        }
        relevant
    }

    /// Relevant passages joined into one context block (empty if none).
    pub async fn context_for(&self, query: &str, k: usize) -> String {
        join_passages(&self.retrieve(query, k).await)
    }
}

/// Join passage texts with blank lines between them.
pub fn join_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
