/// Errors from store adapter operations.
///
/// The variants carry enough structure for callers to branch on the error
/// kind directly; nothing downstream should ever inspect error message text.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed namespace does not exist.
    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    /// The namespace exists but the addressed key does not.
    #[error("key not found: {namespace} :: {key}")]
    KeyNotFound { namespace: String, key: String },

    /// Failure inside the embedded engine (transaction, commit, storage).
    #[error("engine error: {0}")]
    Engine(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn engine(err: impl std::fmt::Display) -> Self {
        Self::Engine(err.to_string())
    }

    pub(crate) fn key_not_found(namespace: &str, key: &str) -> Self {
        Self::KeyNotFound {
            namespace: namespace.to_owned(),
            key: key.to_owned(),
        }
    }

    /// Returns `true` for the two not-found kinds.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NamespaceNotFound(_) | Self::KeyNotFound { .. })
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(err: redb::TransactionError) -> Self {
        Self::engine(err)
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(err: redb::CommitError) -> Self {
        Self::engine(err)
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(err: redb::StorageError) -> Self {
        Self::engine(err)
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
