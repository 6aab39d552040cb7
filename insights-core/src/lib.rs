pub mod completions;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod prompts;
pub mod repo;
pub mod store;

pub use completions::{ChatClient, CompletionError};
pub use config::InsightsConfig;
pub use embeddings::{EmbeddingClient, EmbeddingError, EMBEDDING_DIMENSIONS};
pub use error::InsightsError;
pub use index::{IndexClient, IndexError, IndexHandle, IndexSpec, VectorRecord};
pub use repo::{Language, RepoRecord};
pub use store::{InsightStore, NO_INSIGHTS_SENTINEL};
