use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Cache error: {0}")]
    Cache(#[from] core_cache::CacheError),

    #[error("Remote catalog error: {0}")]
    Remote(#[from] bridge_traits::BridgeError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
