use folio_store::StoreError;

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The underlying record store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for session results.
pub type SessionResult<T> = Result<T, SessionError>;
