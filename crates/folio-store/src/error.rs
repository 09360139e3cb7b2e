use folio_types::FileId;

/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The write would exceed the storage quota. The prior state of the
    /// target id is unchanged.
    #[error("storage quota exceeded: need {needed} bytes, {available} available")]
    QuotaExceeded { needed: u64, available: u64 },

    /// An operation that requires an existing record was given a missing id.
    /// Plain reads report absence as `Ok(None)` instead.
    #[error("record not found: {0}")]
    NotFound(FileId),

    /// Storing the record would create a cycle in its parent chain.
    #[error("lineage cycle: record {id} appears in its own ancestor chain")]
    LineageCycle { id: FileId },

    /// Failure in the underlying blob substrate.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
