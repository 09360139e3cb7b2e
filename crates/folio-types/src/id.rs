use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Unique identifier for a stored document version (UUID v7 for
/// time-ordering).
///
/// A `FileId` is minted once when a record is created and is never reused
/// for the lifetime of the store. New versions of the same logical document
/// get fresh `FileId`s linked through their parent pointers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(uuid::Uuid);

impl FileId {
    /// Generate a new time-ordered file ID (UUID v7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// The raw 16 UUID bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.short_id())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cheap equality fingerprint of a file's `name | size | last_modified`.
///
/// Used to detect unchanged re-imports without reading payload bytes: two
/// imports of the same on-disk file produce the same `QuickKey`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuickKey([u8; 32]);

impl QuickKey {
    /// Derive a quick key from file identity metadata.
    pub fn derive(name: &str, size: u64, last_modified: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"folio-quickkey");
        hasher.update(name.as_bytes());
        hasher.update(&size.to_le_bytes());
        hasher.update(&last_modified.to_le_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Create a quick key from a pre-computed hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for QuickKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuickKey({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for QuickKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
