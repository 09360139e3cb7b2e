use folio_store::StoreError;
use folio_types::FileId;

/// Errors from lineage operations.
#[derive(Debug, thiserror::Error)]
pub enum LineageError {
    /// The referenced record does not exist.
    #[error("record not found: {0}")]
    NotFound(FileId),

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for lineage operations.
pub type LineageResult<T> = Result<T, LineageError>;
