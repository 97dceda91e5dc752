//! LLM Provider implementations for Plansmith.
//!
//! All providers implement the `plansmith_core::Provider` trait.
//! [`build_from_config`] wires the configured endpoint.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
