//! The durable blob substrate interface.
//!
//! The record store never talks to disk (or a browser storage API) itself;
//! it writes payload bytes through [`BlobStore`] and keeps metadata
//! separately. [`InMemoryBlobStore`] is the reference backend, with an
//! optional quota so callers can exercise exhaustion paths.

use std::collections::HashMap;
use std::sync::RwLock;

use folio_types::FileId;

use crate::error::{StoreError, StoreResult};

/// Storage usage as reported by the substrate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UsageEstimate {
    /// Bytes currently used.
    pub used: u64,
    /// Total quota, if the substrate enforces one.
    pub quota: Option<u64>,
}

impl UsageEstimate {
    /// Remaining capacity, if a quota is enforced.
    pub fn available(&self) -> Option<u64> {
        self.quota.map(|q| q.saturating_sub(self.used))
    }
}

/// Durable blob substrate.
///
/// Implementations must make `put` atomic per id: after a failed `put` the
/// prior value of that id (or its absence) is still observable. Writes to
/// different ids are independent.
pub trait BlobStore: Send + Sync {
    /// Write the payload for an id, replacing any prior value.
    fn put(&self, id: FileId, bytes: &[u8]) -> StoreResult<()>;

    /// Read the payload for an id. Returns `Ok(None)` if absent.
    fn get(&self, id: FileId) -> StoreResult<Option<Vec<u8>>>;

    /// Delete the payload for an id. Returns `true` if it existed.
    fn delete(&self, id: FileId) -> StoreResult<bool>;

    /// Current usage and quota.
    fn estimate_usage(&self) -> StoreResult<UsageEstimate>;
}

/// In-memory, HashMap-based blob substrate.
///
/// Intended for tests and embedding. An optional quota makes capacity
/// exhaustion observable: a `put` that would exceed it fails without
/// touching the target id.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<FileId, Vec<u8>>>,
    quota: Option<u64>,
}

impl InMemoryBlobStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            quota: None,
        }
    }

    /// Create a store that rejects writes beyond `quota` total bytes.
    pub fn with_quota(quota: u64) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    fn used_locked(blobs: &HashMap<FileId, Vec<u8>>) -> u64 {
        blobs.values().map(|b| b.len() as u64).sum()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn put(&self, id: FileId, bytes: &[u8]) -> StoreResult<()> {
        let mut blobs = self.blobs.write().expect("lock poisoned");
        if let Some(quota) = self.quota {
            // Replacement accounting: the old value of this id is freed by
            // the same write that lands the new one.
            let old_len = blobs.get(&id).map(|b| b.len() as u64).unwrap_or(0);
            let used = Self::used_locked(&blobs) - old_len;
            let needed = bytes.len() as u64;
            if used + needed > quota {
                return Err(StoreError::QuotaExceeded {
                    needed,
                    available: quota.saturating_sub(used),
                });
            }
        }
        blobs.insert(id, bytes.to_vec());
        Ok(())
    }

    fn get(&self, id: FileId) -> StoreResult<Option<Vec<u8>>> {
        let blobs = self.blobs.read().expect("lock poisoned");
        Ok(blobs.get(&id).cloned())
    }

    fn delete(&self, id: FileId) -> StoreResult<bool> {
        let mut blobs = self.blobs.write().expect("lock poisoned");
        Ok(blobs.remove(&id).is_some())
    }

    fn estimate_usage(&self) -> StoreResult<UsageEstimate> {
        let blobs = self.blobs.read().expect("lock poisoned");
        Ok(UsageEstimate {
            used: Self::used_locked(&blobs),
            quota: self.quota,
        })
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .field("quota", &self.quota)
            .finish()
    }
}
