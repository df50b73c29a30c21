// Indexer module
// Builds the vector index from the grants file and loads persisted indexes


use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::database::lancedb::{EmbeddingRecord, StoredChunk, VectorStore};
use crate::embeddings::chunking::{GrantChunk, chunk_documents};
use crate::embeddings::ollama::OllamaClient;
use crate::grants::{GrantDocument, load_grants};
use crate::{GrantRagError, Result};

/// Statistics from one index build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub grants: usize,
    pub chunks: usize,
}

/// Builds the vector index once at startup, or loads the persisted one.
/// Rebuilding while serving queries is not supported; after this hands the
/// store over, the index is read-only shared state.
pub struct Indexer {
    config: Config,
    client: OllamaClient,
}

impl Indexer {
    #[inline]
    pub fn new(config: Config) -> Result<Self> {
        let client =
            OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;
        Ok(Self { config, client })
    }

    /// Load the persisted index if one exists, otherwise build it from the
    /// grants file. A corrupt persisted index is wiped and rebuilt rather
    /// than surfaced to the caller.
    ///
    /// # Returns
    /// The ready store, plus build statistics when a build actually ran
    #[inline]
    pub async fn ensure_index(&self) -> Result<(VectorStore, Option<IndexStats>)> {
        match VectorStore::open_existing(&self.config).await {
            Ok(Some(store)) => {
                info!(
                    "Loaded persisted index ({} rows)",
                    store.count_rows().await?
                );
                Ok((store, None))
            }
            Ok(None) => {
                info!("No persisted index found, building from grants file");
                let (store, stats) = self.build_index().await?;
                Ok((store, Some(stats)))
            }
            Err(GrantRagError::CorruptIndex(reason)) => {
                warn!("Persisted index is unusable ({}), rebuilding", reason);
                VectorStore::wipe(&self.config)?;
                let (store, stats) = self.build_index().await?;
                Ok((store, Some(stats)))
            }
            Err(e) => Err(e),
        }
    }

    /// Build the index from scratch. The build is atomic: every chunk is
    /// embedded before anything is written, and a failed write drops the
    /// partial dataset.
    #[inline]
    pub async fn build_index(&self) -> Result<(VectorStore, IndexStats)> {
        let grants = load_grants(&self.config.grants_file_path())?;
        let documents: Vec<GrantDocument> = grants.iter().map(|g| g.normalize()).collect();
        let chunks = chunk_documents(&documents, &self.config.chunking)?;
        info!(
            "Normalized {} grants into {} chunks",
            documents.len(),
            chunks.len()
        );

        let records = self.embed_chunks(&chunks)?;

        let mut store = VectorStore::create(&self.config).await?;
        if let Err(e) = store.store_embeddings_batch(records).await {
            // a half-written dataset must not survive a failed build
            let _ = VectorStore::wipe(&self.config);
            return Err(e);
        }

        info!(
            "Index build complete: {} grants, {} chunks",
            documents.len(),
            chunks.len()
        );
        Ok((
            store,
            IndexStats {
                grants: documents.len(),
                chunks: chunks.len(),
            },
        ))
    }

    fn embed_chunks(&self, chunks: &[GrantChunk]) -> Result<Vec<EmbeddingRecord>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self
            .client
            .embed_batch(&texts)
            .map_err(|e| GrantRagError::Embedding(format!("{:#}", e)))?;

        let created_at = Utc::now().to_rfc3339();
        Ok(chunks
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(seq, (chunk, vector))| EmbeddingRecord {
                id: Uuid::new_v4().to_string(),
                vector,
                seq: seq as u32,
                chunk: StoredChunk {
                    content: chunk.content.clone(),
                    chunk_index: chunk.chunk_index as u32,
                    metadata: chunk.metadata.clone(),
                    created_at: created_at.clone(),
                },
            })
            .collect())
    }
}
