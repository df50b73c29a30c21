
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grants::{GrantDocument, GrantMetadata};
use crate::{GrantRagError, Result};

/// A bounded window of one grant document, the unit indexed and retrieved.
/// Every chunk carries its parent document's full metadata; a chunk never
/// spans two records.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantChunk {
    pub content: String,
    pub metadata: GrantMetadata,
    /// Position of this chunk within its source document
    pub chunk_index: usize,
}

/// Configuration for document chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub max_chunk_size: usize,
    /// Overlap in characters between consecutive chunks of one document
    pub overlap_size: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            overlap_size: 200,
        }
    }
}

impl ChunkingConfig {
    /// Reject window shapes that cannot make progress. An overlap at or
    /// above the window size would re-read the same region forever.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(GrantRagError::Config(
                "max_chunk_size must be at least 1".to_string(),
            ));
        }
        if self.overlap_size >= self.max_chunk_size {
            return Err(GrantRagError::Config(format!(
                "overlap_size ({}) must be smaller than max_chunk_size ({})",
                self.overlap_size, self.max_chunk_size
            )));
        }
        Ok(())
    }
}

/// Split each document independently into overlapping character windows,
/// copying the parent metadata onto every chunk. Documents at or under the
/// window size come through as a single verbatim chunk.
#[inline]
pub fn chunk_documents(
    docs: &[GrantDocument],
    config: &ChunkingConfig,
) -> Result<Vec<GrantChunk>> {
    config.validate()?;

    let mut chunks = Vec::new();
    for doc in docs {
        for (chunk_index, content) in split_text(&doc.text, config).into_iter().enumerate() {
            chunks.push(GrantChunk {
                content,
                metadata: doc.metadata.clone(),
                chunk_index,
            });
        }
    }

    debug!("Split {} documents into {} chunks", docs.len(), chunks.len());
    Ok(chunks)
}

/// Split one document's text into windows of at most `max_chunk_size`
/// characters. Each window after the first re-reads the trailing
/// `overlap_size` characters of its predecessor, so stripping that prefix
/// from every chunk but the first reconstructs the source text exactly.
///
/// A window prefers to end at a paragraph break, then a sentence break, then
/// a word break; only when none lands past the overlap region does it cut at
/// the hard character boundary. That floor keeps the window start strictly
/// increasing.
fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    if total == 0 {
        return Vec::new();
    }
    if total <= config.max_chunk_size {
        return vec![text.to_string()];
    }

    let mut windows = Vec::new();
    let mut start = 0usize;
    loop {
        let hard_end = (start + config.max_chunk_size).min(total);
        let end = if hard_end < total {
            find_cut(&chars, start + config.overlap_size + 1, hard_end)
        } else {
            hard_end
        };

        windows.push(chars[start..end].iter().collect());
        if end >= total {
            break;
        }
        start = end - config.overlap_size;
    }
    windows
}

/// Find the best cut position in `(min_cut..=hard_end)`, scanning backwards
/// from the window end, one boundary class at a time.
fn find_cut(chars: &[char], min_cut: usize, hard_end: usize) -> usize {
    // Paragraph break: cut just after a blank line
    for cut in (min_cut..=hard_end).rev() {
        if cut >= 2 && chars[cut - 1] == '\n' && chars[cut - 2] == '\n' {
            return cut;
        }
    }

    // Sentence break: cut just after terminal punctuation followed by
    // whitespace
    for cut in (min_cut..=hard_end).rev() {
        if cut < chars.len()
            && matches!(chars[cut - 1], '.' | '!' | '?')
            && chars[cut].is_whitespace()
        {
            return cut;
        }
    }

    // Word break
    for cut in (min_cut..=hard_end).rev() {
        if chars[cut - 1].is_whitespace() {
            return cut;
        }
    }

    hard_end
}
