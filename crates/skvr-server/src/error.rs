use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] skvr_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Transient failures (bind/accept I/O) are worth a bounded retry;
    /// configuration and store-open failures are fatal.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Internal(_))
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
