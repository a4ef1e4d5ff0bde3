use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoordinationError>;

#[derive(Error, Debug)]
pub enum CoordinationError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(usize),
}
