use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tokio::sync::broadcast;
use tracing::debug;

use folio_types::{FileId, QuickKey};

use crate::blob::{BlobStore, InMemoryBlobStore, UsageEstimate};
use crate::error::{StoreError, StoreResult};
use crate::event::StoreEvent;
use crate::record::{FileStub, RecordPatch, StoredRecord};
use crate::traits::RecordStore;

/// Capacity of the change-event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// In-memory record store over a pluggable blob substrate.
///
/// Metadata stubs live in a `HashMap` behind an `RwLock`; payload bytes go
/// through the [`BlobStore`]. The write order — payload first, metadata
/// second — is what makes `store` atomic: a blob failure (quota, backend)
/// happens before any metadata is touched, so a reader either sees the
/// complete prior state of the id or the complete new one. Both steps run
/// under the stubs write lock, serializing commits to the same id so
/// last-writer-wins holds without interleaving. Lock order is always stubs
/// before blobs.
pub struct InMemoryRecordStore<B: BlobStore = InMemoryBlobStore> {
    stubs: RwLock<HashMap<FileId, FileStub>>,
    blobs: B,
    events: broadcast::Sender<StoreEvent>,
}

impl InMemoryRecordStore<InMemoryBlobStore> {
    /// Create a store over an unbounded in-memory substrate.
    pub fn new() -> Self {
        Self::with_blob_store(InMemoryBlobStore::new())
    }

    /// Create a store whose substrate rejects writes beyond `quota` bytes.
    pub fn with_quota(quota: u64) -> Self {
        Self::with_blob_store(InMemoryBlobStore::with_quota(quota))
    }
}

impl<B: BlobStore> InMemoryRecordStore<B> {
    /// Create a store over the given blob substrate.
    pub fn with_blob_store(blobs: B) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            stubs: RwLock::new(HashMap::new()),
            blobs,
            events,
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.stubs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.stubs.read().expect("lock poisoned").is_empty()
    }

    fn emit(&self, event: StoreEvent) {
        // A send error only means nobody is subscribed.
        let _ = self.events.send(event);
        debug!(event = %event, "store event");
    }

    /// Reject a record whose declared parent chain already contains its own
    /// id (walk-on-insert cycle check).
    fn validate_lineage(&self, record: &StoredRecord) -> StoreResult<()> {
        let stubs = self.stubs.read().expect("lock poisoned");
        let mut visited = HashSet::new();
        let mut cursor = record.parent_file_id;
        while let Some(parent) = cursor {
            if parent == record.id || !visited.insert(parent) {
                return Err(StoreError::LineageCycle { id: record.id });
            }
            cursor = stubs.get(&parent).and_then(|s| s.parent_file_id);
        }
        Ok(())
    }
}

impl Default for InMemoryRecordStore<InMemoryBlobStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BlobStore> RecordStore for InMemoryRecordStore<B> {
    fn store(&self, record: &StoredRecord) -> StoreResult<()> {
        self.validate_lineage(record)?;

        // Payload first, then metadata, both under the stubs write lock:
        // a blob failure leaves the id's prior state untouched, and two
        // writers racing on the same id commit payload and stub as one
        // unit, never interleaved.
        let existed = {
            let mut stubs = self.stubs.write().expect("lock poisoned");
            self.blobs.put(record.id, &record.payload)?;
            stubs.insert(record.id, record.stub()).is_some()
        };

        if existed {
            self.emit(StoreEvent::RecordUpdated(record.id));
        } else {
            self.emit(StoreEvent::RecordAdded(record.id));
        }
        debug!(
            id = %record.id.short_id(),
            version = record.version_number,
            size = record.size,
            "record stored"
        );
        Ok(())
    }

    fn get(&self, id: FileId) -> StoreResult<Option<StoredRecord>> {
        let stub = {
            let stubs = self.stubs.read().expect("lock poisoned");
            stubs.get(&id).cloned()
        };
        let Some(stub) = stub else {
            return Ok(None);
        };
        let payload = self.blobs.get(id)?.ok_or_else(|| {
            StoreError::Backend(format!("payload missing for stored record {id}"))
        })?;
        Ok(Some(stub.into_record(payload)))
    }

    fn get_stub(&self, id: FileId) -> StoreResult<Option<FileStub>> {
        let stubs = self.stubs.read().expect("lock poisoned");
        Ok(stubs.get(&id).cloned())
    }

    fn delete(&self, id: FileId) -> StoreResult<bool> {
        // Payload first, mirroring `store`: a substrate failure propagates
        // before the stub is touched, leaving the record fully retrievable.
        let existed = {
            let mut stubs = self.stubs.write().expect("lock poisoned");
            self.blobs.delete(id)?;
            stubs.remove(&id).is_some()
        };
        if existed {
            self.emit(StoreEvent::RecordRemoved(id));
        }
        Ok(existed)
    }

    fn list_all(&self) -> StoreResult<Vec<FileStub>> {
        let stubs = self.stubs.read().expect("lock poisoned");
        let mut all: Vec<FileStub> = stubs.values().cloned().collect();
        all.sort_by_key(|s| s.id);
        Ok(all)
    }

    fn list_leaves(&self) -> StoreResult<Vec<FileStub>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|s| s.is_leaf)
            .collect())
    }

    fn update(&self, id: FileId, patch: RecordPatch) -> StoreResult<()> {
        {
            let mut stubs = self.stubs.write().expect("lock poisoned");
            let stub = stubs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            patch.apply(stub);
        }
        self.emit(StoreEvent::RecordUpdated(id));
        Ok(())
    }

    fn find_by_quick_key(&self, key: &QuickKey) -> StoreResult<Option<FileStub>> {
        let mut matches: Vec<FileStub> = {
            let stubs = self.stubs.read().expect("lock poisoned");
            stubs
                .values()
                .filter(|s| s.quick_key == *key)
                .cloned()
                .collect()
        };
        matches.sort_by_key(|s| s.id);
        Ok(matches.into_iter().next())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn usage(&self) -> StoreResult<UsageEstimate> {
        self.blobs.estimate_usage()
    }

    fn clear_all(&self) -> StoreResult<()> {
        let ids: Vec<FileId> = {
            let stubs = self.stubs.read().expect("lock poisoned");
            stubs.keys().copied().collect()
        };
        for id in ids {
            self.delete(id)?;
        }
        Ok(())
    }
}

impl<B: BlobStore> std::fmt::Debug for InMemoryRecordStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecordStore")
            .field("record_count", &self.len())
            .finish()
    }
}
