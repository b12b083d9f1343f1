use thiserror::Error;

/// Errors surfaced by external collaborator implementations.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Remote catalog error: {0}")]
    Remote(String),

    #[error("Media storage error: {0}")]
    Media(String),

    #[error("Invalid payload: {field} - {message}")]
    InvalidPayload { field: String, message: String },

    #[error("Capability not available: {0}")]
    NotAvailable(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
