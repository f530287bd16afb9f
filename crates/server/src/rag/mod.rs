//! Retrieval-augmented generation clients.
//!
//! Thin clients over the external collaborators of the answer pipeline:
//!
//! - [`embeddings`] - Embeds a query via an OpenAI-compatible embeddings API
//! - [`retriever`] - Similarity search against the pre-built vector index
//! - [`generator`] - One-shot chat completion against an OpenAI-compatible API
//! - [`prompt`] - The fixed grounding prompt the generator is held to
//!
//! No retrieval or ranking logic lives here; the knowledge base is indexed
//! elsewhere and these clients only consume it.

pub mod embeddings;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod retriever;

pub use embeddings::EmbeddingClient;
pub use error::RagError;
pub use generator::GeneratorClient;
pub use retriever::ContextRetriever;
