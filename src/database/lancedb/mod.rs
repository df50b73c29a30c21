// LanceDB vector database module
// Handles vector storage and similarity search for grant chunk embeddings

pub mod vector_store;

use serde::{Deserialize, Serialize};

use crate::grants::GrantMetadata;

pub use vector_store::{SearchResult, VectorStore};

/// One embedding row written to LanceDB. Rows are created once during a
/// build and never mutated; the whole index is replaced together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Unique identifier for this row
    pub id: String,
    /// The vector embedding
    pub vector: Vec<f32>,
    /// Global insertion ordinal, used to break distance ties
    /// deterministically
    pub seq: u32,
    /// The chunk this embedding represents
    pub chunk: StoredChunk,
}

/// Chunk text and grant metadata stored alongside the vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    /// The chunk's text content
    pub content: String,
    /// Position of the chunk within its source grant document
    pub chunk_index: u32,
    /// Metadata projected from the owning grant record
    pub metadata: GrantMetadata,
    /// Timestamp when this row was written
    pub created_at: String,
}
