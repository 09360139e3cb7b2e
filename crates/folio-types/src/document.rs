//! The composite document and its reconciliation signature.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::FileId;
use crate::page::{PageDescriptor, PageId};

/// Fingerprint of the set of file ids contributing to an assembly.
///
/// Order-insensitive by construction: ids are sorted and deduplicated before
/// hashing, so reordering or reselecting files never changes the signature —
/// only adding or removing a file does. Used to decide whether a cached
/// [`CompositeDocument`] is still valid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature([u8; 32]);

impl Signature {
    /// Compute the signature of a file set.
    pub fn of_file_set<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = FileId>,
    {
        let mut sorted: Vec<FileId> = ids.into_iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut hasher = blake3::Hasher::new();
        hasher.update(b"folio-signature");
        for id in &sorted {
            hasher.update(id.as_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// The signature of the empty file set.
    pub fn empty() -> Self {
        Self::of_file_set(std::iter::empty())
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0[..4]))
    }
}

/// The assembled page sequence produced from multiple source files.
///
/// Ephemeral and cache-only: recomputed on demand, kept around purely so the
/// reconciler can preserve page identity across recomputations. Construction
/// is the only way to set `total_pages`, so it can never go stale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDocument {
    pages: Vec<PageDescriptor>,
    total_pages: usize,
    signature: Signature,
}

impl CompositeDocument {
    /// Build a document from an assembled page sequence.
    pub fn new(pages: Vec<PageDescriptor>, signature: Signature) -> Self {
        let total_pages = pages.len();
        Self {
            pages,
            total_pages,
            signature,
        }
    }

    /// An empty document.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Signature::empty())
    }

    /// The ordered page sequence.
    pub fn pages(&self) -> &[PageDescriptor] {
        &self.pages
    }

    /// Number of pages; always equal to `pages().len()`.
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// The contributing-file-set signature this document was built from.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns `true` if the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The set of page ids in this document.
    pub fn page_id_set(&self) -> HashSet<PageId> {
        self.pages.iter().map(|p| p.id).collect()
    }
}
