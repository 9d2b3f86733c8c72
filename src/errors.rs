use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("LLM provider error: {0}")]
    LlmProvider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<qdrant_client::QdrantError> for AssistantError {
    fn from(e: qdrant_client::QdrantError) -> Self {
        AssistantError::VectorStore(e.to_string())
    }
}

pub type AssistantResult<T> = Result<T, AssistantError>;
