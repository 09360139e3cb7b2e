use folio_types::FileId;

/// Typed change event emitted by a record store.
///
/// Consumers subscribe through [`RecordStore::subscribe`] and coalesce
/// bursts themselves; the store emits exactly one event per committed
/// mutation, after the mutation is observable.
///
/// [`RecordStore::subscribe`]: crate::traits::RecordStore::subscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// A record was stored under a previously unused id.
    RecordAdded(FileId),
    /// A record's metadata was patched or its payload replaced.
    RecordUpdated(FileId),
    /// A record was removed.
    RecordRemoved(FileId),
}

impl StoreEvent {
    /// The id the event pertains to.
    pub fn file_id(&self) -> FileId {
        match self {
            Self::RecordAdded(id) | Self::RecordUpdated(id) | Self::RecordRemoved(id) => *id,
        }
    }
}

impl std::fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordAdded(id) => write!(f, "RecordAdded({})", id.short_id()),
            Self::RecordUpdated(id) => write!(f, "RecordUpdated({})", id.short_id()),
            Self::RecordRemoved(id) => write!(f, "RecordRemoved({})", id.short_id()),
        }
    }
}
