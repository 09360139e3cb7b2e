use std::collections::HashSet;

use folio_types::{FileId, PageId};

/// Ordered splice instructions: anchor page id to the files inserted
/// immediately after it.
///
/// Iteration order is insertion order, which is caller-controlled and
/// deterministic. Multiple entries may target the same anchor; they are
/// applied in entry order, each landing after the growing tail of the
/// previous insertion at that anchor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InsertionMap {
    entries: Vec<(PageId, Vec<FileId>)>,
}

impl InsertionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of insertion entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no insertion entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an insertion entry.
    pub fn push(&mut self, anchor: PageId, files: Vec<FileId>) {
        self.entries.push((anchor, files));
    }

    /// Remove all entries targeting an anchor. Returns `true` if any were
    /// removed.
    pub fn remove(&mut self, anchor: PageId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(a, _)| *a != anchor);
        self.entries.len() != before
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(PageId, Vec<FileId>)> {
        self.entries.iter()
    }

    /// The set of file ids appearing as an insertion source.
    pub fn source_files(&self) -> HashSet<FileId> {
        self.entries
            .iter()
            .flat_map(|(_, files)| files.iter().copied())
            .collect()
    }

    /// A copy with sources failing the predicate dropped from every entry.
    pub fn retain_sources<F>(&self, keep: F) -> Self
    where
        F: Fn(&FileId) -> bool,
    {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(anchor, files)| {
                    let kept: Vec<FileId> = files.iter().copied().filter(|f| keep(f)).collect();
                    (*anchor, kept)
                })
                .collect(),
        }
    }
}

impl FromIterator<(PageId, Vec<FileId>)> for InsertionMap {
    fn from_iter<I: IntoIterator<Item = (PageId, Vec<FileId>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: u32) -> PageId {
        PageId::derive(FileId::new(), 0, n)
    }

    #[test]
    fn preserves_insertion_order() {
        let (a, b) = (page(1), page(2));
        let (f1, f2) = (FileId::new(), FileId::new());

        let mut map = InsertionMap::new();
        map.push(b, vec![f1]);
        map.push(a, vec![f2]);

        let anchors: Vec<PageId> = map.iter().map(|(anchor, _)| *anchor).collect();
        assert_eq!(anchors, vec![b, a]);
    }

    #[test]
    fn remove_drops_every_entry_for_anchor() {
        let anchor = page(1);
        let mut map = InsertionMap::new();
        map.push(anchor, vec![FileId::new()]);
        map.push(anchor, vec![FileId::new()]);
        map.push(page(2), vec![FileId::new()]);

        assert!(map.remove(anchor));
        assert_eq!(map.len(), 1);
        assert!(!map.remove(anchor));
    }

    #[test]
    fn source_files_flattens_values() {
        let (f1, f2) = (FileId::new(), FileId::new());
        let mut map = InsertionMap::new();
        map.push(page(1), vec![f1, f2]);
        map.push(page(2), vec![f1]);

        let sources = map.source_files();
        assert_eq!(sources.len(), 2);
        assert!(sources.contains(&f1) && sources.contains(&f2));
    }

    #[test]
    fn retain_sources_filters_values_in_place() {
        let (keep, drop) = (FileId::new(), FileId::new());
        let mut map = InsertionMap::new();
        map.push(page(1), vec![keep, drop]);

        let filtered = map.retain_sources(|f| *f == keep);
        assert_eq!(filtered.len(), 1);
        let (_, files) = filtered.iter().next().unwrap();
        assert_eq!(files, &vec![keep]);
    }
}
