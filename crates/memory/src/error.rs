use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemoryError>;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unsupported memory file schema_version {0} (expected 1)")]
    UnsupportedSchema(u32),

    #[error("Memory entry id must not be empty")]
    EmptyId,
}
