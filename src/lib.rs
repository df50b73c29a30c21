use thiserror::Error;

pub type Result<T> = std::result::Result<T, GrantRagError>;

#[derive(Error, Debug)]
pub enum GrantRagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod api;
pub mod commands;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod grants;
pub mod indexer;
pub mod pipeline;
