use thiserror::Error;

/// Errors writing the catalog document
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write catalog: {0}")]
    Write(String),
}
