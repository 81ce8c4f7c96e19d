use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure raised by a storage backend, tagged with the backend that raised it.
///
/// The message is meant for logs only; services replace it before answering clients.
#[derive(Debug, Error)]
#[error("{backend} storage failed: {message}")]
pub struct StorageError {
    backend: &'static str,
    message: String,
    #[source]
    source: Box<dyn Error + Send + Sync>,
}

impl StorageError {
    /// Wrap a backend error; its `Display` output becomes the log message.
    pub fn new(backend: &'static str, source: impl Error + Send + Sync + 'static) -> Self {
        Self {
            backend,
            message: source.to_string(),
            source: Box::new(source),
        }
    }

    /// Name of the backend that failed ("mongodb", "couchdb", ...).
    pub fn backend(&self) -> &'static str {
        self.backend
    }
}
