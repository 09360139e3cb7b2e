use std::collections::HashSet;

use tracing::debug;

use folio_store::{FileStub, RecordPatch, RecordStore, StoredRecord};
use folio_types::FileId;

use crate::error::{LineageError, LineageResult};

/// Lineage operations over a record store.
///
/// Borrows the store for the duration of a call sequence; owns no state of
/// its own. Consumption flags never cascade: marking a version processed
/// says nothing about its children.
pub struct LineageTracker<'a, S: RecordStore> {
    store: &'a S,
}

impl<'a, S: RecordStore> LineageTracker<'a, S> {
    /// Create a tracker over the given store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Mark a record as consumed by a downstream tool (`is_leaf = false`).
    ///
    /// Does not cascade to children.
    pub fn mark_processed(&self, id: FileId) -> LineageResult<()> {
        self.store.update(id, RecordPatch::leaf(false))?;
        debug!(id = %id.short_id(), "record marked processed");
        Ok(())
    }

    /// Promote a record back to active status (`is_leaf = true`).
    pub fn mark_leaf(&self, id: FileId) -> LineageResult<()> {
        self.store.update(id, RecordPatch::leaf(true))?;
        debug!(id = %id.short_id(), "record marked leaf");
        Ok(())
    }

    /// The lineage root of a record.
    ///
    /// An O(1) field read of `original_file_id`, not a graph walk.
    pub fn root(&self, id: FileId) -> LineageResult<FileId> {
        let stub = self
            .store
            .get_stub(id)?
            .ok_or(LineageError::NotFound(id))?;
        Ok(stub.original_file_id)
    }

    /// Walk the parent chain from a record to its root, nearest first.
    ///
    /// The record itself is not included. Stops at the first parent no
    /// longer present in the store.
    pub fn ancestors(&self, id: FileId) -> LineageResult<Vec<FileStub>> {
        let start = self
            .store
            .get_stub(id)?
            .ok_or(LineageError::NotFound(id))?;

        let mut visited = HashSet::new();
        visited.insert(id);
        let mut chain = Vec::new();
        let mut cursor = start.parent_file_id;
        while let Some(parent) = cursor {
            if !visited.insert(parent) {
                break;
            }
            let Some(stub) = self.store.get_stub(parent)? else {
                break;
            };
            cursor = stub.parent_file_id;
            chain.push(stub);
        }
        Ok(chain)
    }

    /// All stored versions of a lineage, ordered by version number.
    pub fn version_history(&self, original_file_id: FileId) -> LineageResult<Vec<FileStub>> {
        let mut versions: Vec<FileStub> = self
            .store
            .list_all()?
            .into_iter()
            .filter(|s| s.original_file_id == original_file_id)
            .collect();
        versions.sort_by_key(|s| s.version_number);
        Ok(versions)
    }

    /// Commit a tool's output: store the new version and mark every
    /// consumed input as processed.
    ///
    /// This is the tool-pipeline entry point. The output record is expected
    /// to carry its lineage links already (see
    /// [`StoredRecord::derive_version`]).
    pub fn commit_tool_output(
        &self,
        consumed_inputs: &[FileId],
        output: &StoredRecord,
    ) -> LineageResult<()> {
        self.store.store(output)?;
        for &input in consumed_inputs {
            self.mark_processed(input)?;
        }
        debug!(
            output = %output.id.short_id(),
            inputs = consumed_inputs.len(),
            version = output.version_number,
            "tool output committed"
        );
        Ok(())
    }
}
