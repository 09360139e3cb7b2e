//! Page identifiers, descriptors, and per-file page metadata.
//!
//! [`PageId`]s are derived deterministically from the contributing file and
//! page position rather than minted at random. Determinism is what keeps
//! descriptor identity stable across repeated assemblies: as long as the
//! same file contributes the same page, the id comes out the same, and a
//! consumer holding on to it (drag state, cached thumbnails) never sees it
//! change underneath an unrelated recomputation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::FileId;

/// Deterministic identifier for one page of a composite document.
///
/// Derived from `(file_id, occurrence, original_page_number)` with a domain
/// separation prefix. The `occurrence` ordinal disambiguates a file that
/// expands more than once within a single assembly, keeping ids unique
/// within one document.
///
/// A pending placeholder for page N and the real page N that later replaces
/// it share the same id on purpose: resolved metadata lands in the same
/// identity slot instead of forcing a rebuild.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId([u8; 32]);

impl PageId {
    /// Derive the id for a page contributed by `file_id`.
    pub fn derive(file_id: FileId, occurrence: u32, original_page_number: u32) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"folio-page");
        hasher.update(file_id.as_bytes());
        hasher.update(&occurrence.to_le_bytes());
        hasher.update(&original_page_number.to_le_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Create a `PageId` from a pre-computed hash.
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

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
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

impl fmt::Debug for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageId({})", self.short_hex())
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Real metadata for one page of a processed file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Rotation in degrees (multiples of 90).
    pub rotation: i32,
    /// Whether a document split follows this page.
    pub split_after: bool,
    /// Rendered thumbnail reference, if one exists.
    pub thumbnail: Option<String>,
}

/// Per-file page metadata, one entry per real page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub pages: Vec<PageInfo>,
}

impl PageMetadata {
    /// Metadata for `count` pages with default attributes.
    pub fn with_page_count(count: u32) -> Self {
        Self {
            pages: vec![PageInfo::default(); count as usize],
        }
    }

    /// Number of real pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }
}

/// One page within a composite document.
///
/// `page_number` is assigned fresh on every assembly; every other field is
/// stable under the identity rules of the reconciler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Stable identity of this page (see [`PageId`]).
    pub id: PageId,
    /// 1-based position in the composite sequence. Always recomputed.
    pub page_number: u32,
    /// The file this page was expanded from.
    pub original_file_id: FileId,
    /// 1-based page number within the source file.
    pub original_page_number: u32,
    /// Rotation in degrees.
    pub rotation: i32,
    /// Thumbnail reference, if rendered.
    pub thumbnail: Option<String>,
    /// True while this page stands in for content not yet available or
    /// deliberately collapsed.
    pub is_placeholder: bool,
    /// Whether a document split follows this page.
    pub split_after: bool,
}

impl PageDescriptor {
    /// A real page backed by metadata.
    pub fn real(file_id: FileId, occurrence: u32, page_number: u32, info: &PageInfo) -> Self {
        Self {
            id: PageId::derive(file_id, occurrence, page_number),
            page_number: 0,
            original_file_id: file_id,
            original_page_number: page_number,
            rotation: info.rotation,
            thumbnail: info.thumbnail.clone(),
            is_placeholder: false,
            split_after: info.split_after,
        }
    }

    /// A placeholder page standing in for content not yet available.
    pub fn placeholder(file_id: FileId, occurrence: u32, page_number: u32) -> Self {
        Self {
            id: PageId::derive(file_id, occurrence, page_number),
            page_number: 0,
            original_file_id: file_id,
            original_page_number: page_number,
            rotation: 0,
            thumbnail: None,
            is_placeholder: true,
            split_after: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_id_is_deterministic() {
        let file = FileId::new();
        assert_eq!(PageId::derive(file, 0, 1), PageId::derive(file, 0, 1));
    }

    #[test]
    fn page_id_varies_by_page_and_occurrence() {
        let file = FileId::new();
        let base = PageId::derive(file, 0, 1);
        assert_ne!(base, PageId::derive(file, 0, 2));
        assert_ne!(base, PageId::derive(file, 1, 1));
        assert_ne!(base, PageId::derive(FileId::new(), 0, 1));
    }

    #[test]
    fn placeholder_and_real_page_share_an_id() {
        let file = FileId::new();
        let placeholder = PageDescriptor::placeholder(file, 0, 2);
        let real = PageDescriptor::real(file, 0, 2, &PageInfo::default());
        assert_eq!(placeholder.id, real.id);
        assert!(placeholder.is_placeholder);
        assert!(!real.is_placeholder);
    }

    #[test]
    fn real_page_carries_metadata() {
        let info = PageInfo {
            rotation: 90,
            split_after: true,
            thumbnail: Some("thumb:1".into()),
        };
        let page = PageDescriptor::real(FileId::new(), 0, 3, &info);
        assert_eq!(page.rotation, 90);
        assert!(page.split_after);
        assert_eq!(page.thumbnail.as_deref(), Some("thumb:1"));
        assert_eq!(page.original_page_number, 3);
    }

    #[test]
    fn page_id_hex_roundtrip() {
        let id = PageId::derive(FileId::new(), 0, 7);
        assert_eq!(id, PageId::from_hex(&id.to_hex()).unwrap());
    }

    #[test]
    fn metadata_with_page_count() {
        let meta = PageMetadata::with_page_count(4);
        assert_eq!(meta.page_count(), 4);
        assert!(meta.pages.iter().all(|p| p.rotation == 0 && !p.split_after));
    }

    #[test]
    fn descriptor_serde_roundtrip() {
        let page = PageDescriptor::placeholder(FileId::new(), 0, 1);
        let json = serde_json::to_string(&page).unwrap();
        let parsed: PageDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(page, parsed);
    }
}
