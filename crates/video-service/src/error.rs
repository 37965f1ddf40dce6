use thiserror::Error;

/// Failure moving bytes in or out of the content store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("content store error: {0}")]
    Store(#[from] object_store::Error),

    #[error("upload source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
