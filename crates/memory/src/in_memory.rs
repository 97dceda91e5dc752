//! In-memory document index backed by provider embeddings.
//!
//! Chunks and their vectors live in a `Vec` behind a `tokio::sync::RwLock`:
//! ingestion takes the write lock once to swap the contents, searches from
//! concurrent requests share the read lock.

use std::sync::Arc;

use async_trait::async_trait;
use plansmith_core::error::MemoryError;
use plansmith_core::memory::{Document, DocumentIndex, Passage};
use plansmith_core::provider::{EmbeddingRequest, Provider};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::chunker::chunk_text;
use crate::vector::nearest;

struct StoredChunk {
    text: String,
    embedding: Vec<f32>,
}

/// A similarity-search index that keeps every chunk in process memory.
pub struct InMemoryIndex {
    provider: Arc<dyn Provider>,
    embedding_model: String,
    chunk_size: usize,
    chunk_overlap: usize,
    chunks: Arc<RwLock<Vec<StoredChunk>>>,
}

impl InMemoryIndex {
    /// Create an empty index that embeds text with `provider`.
    pub fn new(provider: Arc<dyn Provider>, embedding_model: impl Into<String>) -> Self {
        Self {
            provider,
            embedding_model: embedding_model.into(),
            chunk_size: 500,
            chunk_overlap: 100,
            chunks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Override the chunking parameters.
    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, MemoryError> {
        let expected = inputs.len();
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs,
            })
            .await
            .map_err(|e| MemoryError::EmbeddingFailed(e.to_string()))?;

        if response.embeddings.len() != expected {
            return Err(MemoryError::EmbeddingFailed(format!(
                "expected {expected} embeddings, provider returned {}",
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings)
    }

    /// Replace the whole index with chunks of `docs`.
    ///
    /// The documents are concatenated, chunked, and embedded in one batch.
    /// The previous contents are dropped even when `docs` is empty. Returns
    /// the number of chunks stored.
    pub async fn replace_documents(&self, docs: &[Document]) -> Result<usize, MemoryError> {
        let combined: String = docs.iter().map(|d| d.content.as_str()).collect();
        let combined = combined.trim();

        if combined.is_empty() {
            self.chunks.write().await.clear();
            info!("No documents found to insert into the index");
            return Ok(0);
        }

        let texts = chunk_text(combined, self.chunk_size, self.chunk_overlap);
        let embeddings = self.embed(texts.clone()).await?;

        let stored: Vec<StoredChunk> = texts
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| StoredChunk { text, embedding })
            .collect();
        let count = stored.len();

        *self.chunks.write().await = stored;
        info!(chunks = count, "Loaded document chunks into the index");
        Ok(count)
    }
}

#[async_trait]
impl DocumentIndex for InMemoryIndex {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Passage>, MemoryError> {
        if self.chunks.read().await.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embed(vec![query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::EmbeddingFailed("no query embedding".into()))?;

        let chunks = self.chunks.read().await;
        let embeddings: Vec<&[f32]> = chunks.iter().map(|c| c.embedding.as_slice()).collect();
        let hits: Vec<Passage> = nearest(&embeddings, &query_embedding, k)
            .into_iter()
            .map(|(i, distance)| Passage::new(chunks[i].text.clone(), distance))
            .collect();

        debug!(hits = hits.len(), k, "Similarity search complete");
        Ok(hits)
    }
}
