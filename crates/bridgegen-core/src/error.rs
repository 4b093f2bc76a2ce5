use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to read declaration set: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed declaration set: {0}")]
    Json(#[from] serde_json::Error),
}
