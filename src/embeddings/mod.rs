// Embeddings module
// Content chunking and the Ollama embedding/generation client

pub mod chunking;
pub mod ollama;

pub use chunking::{ChunkingConfig, GrantChunk, chunk_documents};
pub use ollama::OllamaClient;
