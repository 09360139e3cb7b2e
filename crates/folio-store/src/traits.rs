use tokio::sync::broadcast;

use folio_types::{FileId, QuickKey};

use crate::blob::UsageEstimate;
use crate::error::StoreResult;
use crate::event::StoreEvent;
use crate::record::{FileStub, RecordPatch, StoredRecord};

/// Versioned record store.
///
/// All implementations must satisfy these invariants:
/// - `store` is atomic: a record is either fully durable or absent; partial
///   writes are never observable by a subsequent `get`.
/// - Capacity exhaustion during `store` leaves the prior state of that id
///   unchanged.
/// - Concurrent writes to the same id are last-writer-wins with no
///   interleaving; writes to different ids are independent.
/// - A record whose parent chain would contain its own id is rejected.
/// - Every committed mutation emits exactly one [`StoreEvent`].
pub trait RecordStore: Send + Sync {
    /// Store a record, replacing any prior version under the same id.
    ///
    /// Replacing an id is last-writer-wins. Rejects lineage cycles.
    fn store(&self, record: &StoredRecord) -> StoreResult<()>;

    /// Read a full record, payload included.
    ///
    /// Returns `Ok(None)` if the id is absent; absence is not an error.
    fn get(&self, id: FileId) -> StoreResult<Option<StoredRecord>>;

    /// Read the metadata-only stub for an id.
    fn get_stub(&self, id: FileId) -> StoreResult<Option<FileStub>>;

    /// Read multiple records in a batch.
    ///
    /// Default implementation calls `get()` per id. Backends may override
    /// to batch I/O round-trips.
    fn get_many(&self, ids: &[FileId]) -> StoreResult<Vec<Option<StoredRecord>>> {
        ids.iter().map(|id| self.get(*id)).collect()
    }

    /// Delete a record. Returns `true` if it existed.
    fn delete(&self, id: FileId) -> StoreResult<bool>;

    /// All stubs, ordered by id for deterministic listing.
    fn list_all(&self) -> StoreResult<Vec<FileStub>>;

    /// Stubs of records not yet consumed by any downstream tool
    /// (`is_leaf != false`).
    fn list_leaves(&self) -> StoreResult<Vec<FileStub>>;

    /// Patch mutable metadata fields of an existing record.
    ///
    /// Fails with `NotFound` if the id is absent.
    fn update(&self, id: FileId, patch: RecordPatch) -> StoreResult<()>;

    /// Find a record by its re-import fingerprint.
    fn find_by_quick_key(&self, key: &QuickKey) -> StoreResult<Option<FileStub>>;

    /// Subscribe to change events.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;

    /// Current storage usage.
    fn usage(&self) -> StoreResult<UsageEstimate>;

    /// Remove every record.
    fn clear_all(&self) -> StoreResult<()>;
}
