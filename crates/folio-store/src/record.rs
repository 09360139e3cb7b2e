//! Stored record, metadata stub, and field patches.

use serde::{Deserialize, Serialize};

use folio_types::{FileId, ProcessingState, QuickKey};

/// One persisted document version.
///
/// Records are immutable for content: an operation that changes a document
/// produces a new record via [`derive_version`], linked to its predecessor
/// through `parent_file_id`. Only presentation metadata (leaf flag,
/// thumbnail, processing state) is patched in place.
///
/// [`derive_version`]: StoredRecord::derive_version
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Globally unique id; never reused for the lifetime of the store.
    pub id: FileId,
    /// Cheap re-import fingerprint over name, size, and modified time.
    pub quick_key: QuickKey,
    /// Binary document payload.
    pub payload: Vec<u8>,
    /// File name.
    pub name: String,
    /// MIME type.
    pub content_type: String,
    /// Payload size in bytes.
    pub size: u64,
    /// Modification time as epoch milliseconds.
    pub last_modified: u64,
    /// True while this version has not been consumed by a downstream tool.
    pub is_leaf: bool,
    /// Monotonic version number within the lineage, starting at 1.
    pub version_number: u32,
    /// The lineage root: the very first version of this logical document.
    /// Invariant across all descendants.
    pub original_file_id: FileId,
    /// Direct predecessor version, or `None` for a lineage root.
    pub parent_file_id: Option<FileId>,
    /// Ordered tags of the operations applied to reach this version.
    pub tool_history: Vec<String>,
    /// Rendered thumbnail reference, if one exists.
    pub thumbnail: Option<String>,
    /// Page-level processing state.
    pub processing: ProcessingState,
}

impl StoredRecord {
    /// Create a fresh lineage root from an imported file.
    pub fn import(
        name: impl Into<String>,
        content_type: impl Into<String>,
        last_modified: u64,
        payload: Vec<u8>,
    ) -> Self {
        let id = FileId::new();
        let name = name.into();
        let size = payload.len() as u64;
        Self {
            id,
            quick_key: QuickKey::derive(&name, size, last_modified),
            payload,
            name,
            content_type: content_type.into(),
            size,
            last_modified,
            is_leaf: true,
            version_number: 1,
            original_file_id: id,
            parent_file_id: None,
            tool_history: Vec::new(),
            thumbnail: None,
            processing: ProcessingState::Unprocessed,
        }
    }

    /// Create the next version of this document from a tool's output.
    ///
    /// The new record gets a fresh id, inherits the lineage root, points to
    /// `self` as its parent, and appends `tool` to the operation history.
    /// The input record itself is untouched; consuming it is a separate
    /// leaf-flag mutation.
    pub fn derive_version(&self, payload: Vec<u8>, tool: impl Into<String>) -> Self {
        let id = FileId::new();
        let size = payload.len() as u64;
        let mut tool_history = self.tool_history.clone();
        tool_history.push(tool.into());
        Self {
            id,
            quick_key: QuickKey::derive(&self.name, size, self.last_modified),
            payload,
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            size,
            last_modified: self.last_modified,
            is_leaf: true,
            version_number: self.version_number + 1,
            original_file_id: self.original_file_id,
            parent_file_id: Some(self.id),
            tool_history,
            thumbnail: None,
            processing: ProcessingState::Unprocessed,
        }
    }

    /// Returns `true` if this record is a lineage root.
    pub fn is_root(&self) -> bool {
        self.parent_file_id.is_none()
    }

    /// The metadata-only projection of this record.
    pub fn stub(&self) -> FileStub {
        FileStub {
            id: self.id,
            quick_key: self.quick_key,
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            size: self.size,
            last_modified: self.last_modified,
            is_leaf: self.is_leaf,
            version_number: self.version_number,
            original_file_id: self.original_file_id,
            parent_file_id: self.parent_file_id,
            tool_history: self.tool_history.clone(),
            thumbnail: self.thumbnail.clone(),
            processing: self.processing.clone(),
        }
    }
}

/// Metadata-only projection of a [`StoredRecord`].
///
/// Carries everything needed for listing, browsing, and assembly without
/// loading payload bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStub {
    pub id: FileId,
    pub quick_key: QuickKey,
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub last_modified: u64,
    pub is_leaf: bool,
    pub version_number: u32,
    pub original_file_id: FileId,
    pub parent_file_id: Option<FileId>,
    pub tool_history: Vec<String>,
    pub thumbnail: Option<String>,
    pub processing: ProcessingState,
}

impl FileStub {
    /// Reassemble a full record from this stub and its payload bytes.
    pub fn into_record(self, payload: Vec<u8>) -> StoredRecord {
        StoredRecord {
            id: self.id,
            quick_key: self.quick_key,
            payload,
            name: self.name,
            content_type: self.content_type,
            size: self.size,
            last_modified: self.last_modified,
            is_leaf: self.is_leaf,
            version_number: self.version_number,
            original_file_id: self.original_file_id,
            parent_file_id: self.parent_file_id,
            tool_history: self.tool_history,
            thumbnail: self.thumbnail,
            processing: self.processing,
        }
    }
}

/// A partial update to a record's mutable metadata fields.
///
/// Fields left as `None` are untouched. Content fields are deliberately
/// absent: content changes go through [`StoredRecord::derive_version`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub is_leaf: Option<bool>,
    pub thumbnail: Option<String>,
    pub processing: Option<ProcessingState>,
}

impl RecordPatch {
    /// Patch that sets the leaf flag.
    pub fn leaf(is_leaf: bool) -> Self {
        Self {
            is_leaf: Some(is_leaf),
            ..Self::default()
        }
    }

    /// Patch that sets the thumbnail reference.
    pub fn thumbnail(thumbnail: impl Into<String>) -> Self {
        Self {
            thumbnail: Some(thumbnail.into()),
            ..Self::default()
        }
    }

    /// Patch that sets the processing state.
    pub fn processing(state: ProcessingState) -> Self {
        Self {
            processing: Some(state),
            ..Self::default()
        }
    }

    /// Apply this patch to a stub.
    pub fn apply(self, stub: &mut FileStub) {
        if let Some(name) = self.name {
            stub.name = name;
        }
        if let Some(is_leaf) = self.is_leaf {
            stub.is_leaf = is_leaf;
        }
        if let Some(thumbnail) = self.thumbnail {
            stub.thumbnail = Some(thumbnail);
        }
        if let Some(processing) = self.processing {
            stub.processing = processing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::PageMetadata;

    #[test]
    fn import_creates_a_lineage_root() {
        let record = StoredRecord::import("a.pdf", "application/pdf", 1_000, b"data".to_vec());
        assert!(record.is_root());
        assert_eq!(record.version_number, 1);
        assert_eq!(record.original_file_id, record.id);
        assert_eq!(record.parent_file_id, None);
        assert_eq!(record.size, 4);
        assert!(record.is_leaf);
        assert!(record.tool_history.is_empty());
    }

    #[test]
    fn derive_version_links_lineage() {
        let root = StoredRecord::import("a.pdf", "application/pdf", 1_000, b"v1".to_vec());
        let child = root.derive_version(b"v2-data".to_vec(), "rotate");

        assert_ne!(child.id, root.id);
        assert_eq!(child.version_number, 2);
        assert_eq!(child.original_file_id, root.id);
        assert_eq!(child.parent_file_id, Some(root.id));
        assert_eq!(child.tool_history, vec!["rotate".to_string()]);
        assert_eq!(child.size, 7);
        assert!(child.is_leaf);
    }

    #[test]
    fn original_file_id_is_invariant_across_descendants() {
        let root = StoredRecord::import("a.pdf", "application/pdf", 1_000, b"v1".to_vec());
        let v2 = root.derive_version(b"v2".to_vec(), "rotate");
        let v3 = v2.derive_version(b"v3".to_vec(), "split");
        assert_eq!(v3.original_file_id, root.id);
        assert_eq!(v3.tool_history, vec!["rotate".to_string(), "split".to_string()]);
    }

    #[test]
    fn stub_drops_payload_only() {
        let record = StoredRecord::import("a.pdf", "application/pdf", 1_000, b"data".to_vec());
        let stub = record.stub();
        assert_eq!(stub.id, record.id);
        assert_eq!(stub.size, record.size);
        assert_eq!(stub.into_record(record.payload.clone()), record);
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let record = StoredRecord::import("a.pdf", "application/pdf", 1_000, b"data".to_vec());
        let mut stub = record.stub();

        RecordPatch::leaf(false).apply(&mut stub);
        assert!(!stub.is_leaf);
        assert_eq!(stub.name, "a.pdf");
        assert_eq!(stub.thumbnail, None);

        RecordPatch::thumbnail("thumb:1").apply(&mut stub);
        assert_eq!(stub.thumbnail.as_deref(), Some("thumb:1"));
        assert!(!stub.is_leaf);
    }

    #[test]
    fn patch_replaces_processing_state() {
        let record = StoredRecord::import("a.pdf", "application/pdf", 1_000, b"data".to_vec());
        let mut stub = record.stub();
        let state = ProcessingState::Processed {
            metadata: PageMetadata::with_page_count(3),
        };
        RecordPatch::processing(state.clone()).apply(&mut stub);
        assert_eq!(stub.processing, state);
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = StoredRecord::import("a.pdf", "application/pdf", 1_000, b"data".to_vec());
        let json = serde_json::to_string(&record).unwrap();
        let parsed: StoredRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
