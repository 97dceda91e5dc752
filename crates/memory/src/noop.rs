//! No-op index, used when generation runs without any uploaded documents.

use async_trait::async_trait;
use plansmith_core::error::MemoryError;
use plansmith_core::memory::{DocumentIndex, Passage};

/// An index that holds nothing and never matches.
pub struct NoopIndex;

#[async_trait]
impl DocumentIndex for NoopIndex {
    fn name(&self) -> &str {
        "none"
    }

    async fn similarity_search(
        &self,
        _query: &str,
        _k: usize,
    ) -> Result<Vec<Passage>, MemoryError> {
        Ok(Vec::new())
    }
}
