//! Document index trait — similarity search over previously ingested text.
//!
//! The generation pipeline only ever *reads* from the index: it asks for the
//! `k` passages nearest to the user's request and uses the relevant ones as
//! grounding. Ingestion (chunking, embedding) lives with the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::MemoryError;

/// An uploaded document, already reduced to plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Original file name (used for logging only)
    pub filename: String,

    /// Extracted text content
    pub content: String,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// The chunk text
    pub text: String,

    /// Distance to the query; lower means more similar
    pub distance: f32,
}

impl Passage {
    pub fn new(text: impl Into<String>, distance: f32) -> Self {
        Self {
            text: text.into(),
            distance,
        }
    }
}

/// The core DocumentIndex trait.
///
/// Implementations must tolerate concurrent `similarity_search` calls from
/// independent requests.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// The backend name (e.g., "in_memory", "none").
    fn name(&self) -> &str;

    /// Return up to `k` passages nearest to `query`, ordered by ascending
    /// distance. An empty index yields an empty list, not an error.
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> std::result::Result<Vec<Passage>, MemoryError>;
}
