use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Mutation failed: {name} - {message}")]
    Mutation { name: String, message: String },

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot rejected: {0}")]
    InvalidSnapshot(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;
