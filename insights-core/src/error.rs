use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Completion error: {0}")]
    Completion(#[from] crate::completions::CompletionError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] crate::embeddings::EmbeddingError),

    #[error("Index error: {0}")]
    Index(#[from] crate::index::IndexError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
