use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Memory search failed: {0}")]
    Memory(String),

    #[error("Vector search failed: {0}")]
    Vector(String),

    #[error("Web search failed: {0}")]
    Web(String),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] vana_vector_store::VectorStoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
