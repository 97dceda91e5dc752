//! Document index implementations for Plansmith.
//!
//! Ingestion turns uploaded files into plain text ([`extract_text`]), splits
//! it into overlapping chunks ([`chunk_text`]), embeds each chunk, and keeps
//! the vectors in an index that answers `similarity_search` queries.

pub mod chunker;
pub mod extract;
pub mod in_memory;
pub mod noop;
pub mod vector;

pub use chunker::chunk_text;
pub use extract::{extract_text, load_documents};
pub use in_memory::InMemoryIndex;
pub use noop::NoopIndex;
pub use vector::{nearest, squared_euclidean_distance};
