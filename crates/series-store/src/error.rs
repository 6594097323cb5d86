use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read raw series data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Raw series document is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
