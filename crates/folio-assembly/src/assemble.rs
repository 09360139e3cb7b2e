//! The pure page-assembly function.
//!
//! `assemble` is deterministic in its inputs and touches no storage: the
//! caller supplies the logical file order, the selection set, the insertion
//! map, and a metadata lookup over an immutable snapshot. Identical inputs
//! always produce an identical page sequence, ids included.

use std::collections::HashMap;

use tracing::warn;

use folio_types::{FileId, PageDescriptor, PageId, ProcessingState};

use crate::insertion::InsertionMap;

/// Assemble a composite page sequence.
///
/// Algorithm:
/// 1. Files appearing as insertion sources are excluded from the base walk;
///    every other file in `file_order` is expanded in that order. The order
///    is the caller's logical order, not arrival order, which keeps
///    placeholder positions stable while data streams in asynchronously.
/// 2. Expansion per file: deselected files collapse to a single placeholder
///    (position preserved without the cost of full expansion); processed
///    files yield one descriptor per real page; probed files yield their
///    approximate count of placeholders; anything else yields one
///    placeholder.
/// 3. Insertions are spliced in entry order, each immediately after its
///    anchor page — or after the tail of earlier insertions at the same
///    anchor, so later entries land further from the anchor rather than
///    interleaving. An insertion whose anchor is not present is dropped.
/// 4. The whole sequence is renumbered 1..N at the end. Numbering is never
///    carried over from a previous assembly.
///
/// A file expanding more than once in one assembly (repeated insertion
/// source) gets a distinct occurrence ordinal per expansion, keeping page
/// ids unique within the document.
pub fn assemble<M>(
    file_order: &[FileId],
    selected: &std::collections::HashSet<FileId>,
    insertions: &InsertionMap,
    metadata_of: M,
) -> Vec<PageDescriptor>
where
    M: Fn(FileId) -> Option<ProcessingState>,
{
    let sources = insertions.source_files();
    let mut occurrences: HashMap<FileId, u32> = HashMap::new();

    let mut expand = |file_id: FileId| -> Vec<PageDescriptor> {
        let slot = occurrences.entry(file_id).or_insert(0);
        let occurrence = *slot;
        *slot += 1;

        if !selected.contains(&file_id) {
            return vec![PageDescriptor::placeholder(file_id, occurrence, 1)];
        }
        match metadata_of(file_id) {
            Some(ProcessingState::Processed { metadata }) => metadata
                .pages
                .iter()
                .enumerate()
                .map(|(i, info)| PageDescriptor::real(file_id, occurrence, i as u32 + 1, info))
                .collect(),
            Some(ProcessingState::Placeholder { page_count, .. }) => (1..=page_count.max(1))
                .map(|n| PageDescriptor::placeholder(file_id, occurrence, n))
                .collect(),
            Some(ProcessingState::Unprocessed) | None => {
                vec![PageDescriptor::placeholder(file_id, occurrence, 1)]
            }
        }
    };

    // Base pass: expansions concatenated in logical order.
    let mut pages: Vec<PageDescriptor> = Vec::new();
    for &file_id in file_order {
        if sources.contains(&file_id) {
            continue;
        }
        pages.extend(expand(file_id));
    }

    // Splice insertions. `tails` remembers the last page spliced at each
    // anchor so a second insertion at the same anchor lands after it.
    let mut tails: HashMap<PageId, PageId> = HashMap::new();
    for (anchor, files) in insertions.iter() {
        let Some(anchor_position) = pages.iter().position(|p| p.id == *anchor) else {
            // Anchor removed in a prior step or never existed: best-effort,
            // the insertion is omitted rather than failing the assembly.
            warn!(anchor = %anchor.short_hex(), "insertion anchor not found; dropping insertion");
            continue;
        };
        // A tail recorded for this anchor was spliced into `pages` by an
        // earlier entry, and nothing removes pages within one assembly, so
        // the lookup must succeed.
        let position = match tails.get(anchor) {
            Some(tail) => pages
                .iter()
                .position(|p| p.id == *tail)
                .expect("spliced tail page present"),
            None => anchor_position,
        };

        let mut spliced: Vec<PageDescriptor> = Vec::new();
        for &file_id in files {
            spliced.extend(expand(file_id));
        }
        if let Some(last) = spliced.last() {
            tails.insert(*anchor, last.id);
        }
        let at = position + 1;
        pages.splice(at..at, spliced);
    }

    // Renumber 1..N; page numbers are always fresh.
    for (index, page) in pages.iter_mut().enumerate() {
        page.page_number = index as u32 + 1;
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::{PageInfo, PageMetadata};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn processed(count: u32) -> ProcessingState {
        ProcessingState::Processed {
            metadata: PageMetadata::with_page_count(count),
        }
    }

    fn metadata_map(
        entries: &[(FileId, ProcessingState)],
    ) -> impl Fn(FileId) -> Option<ProcessingState> + '_ {
        move |id| {
            entries
                .iter()
                .find(|(file, _)| *file == id)
                .map(|(_, state)| state.clone())
        }
    }

    fn numbers(pages: &[PageDescriptor]) -> Vec<u32> {
        pages.iter().map(|p| p.page_number).collect()
    }

    fn sources(pages: &[PageDescriptor]) -> Vec<(FileId, u32)> {
        pages
            .iter()
            .map(|p| (p.original_file_id, p.original_page_number))
            .collect()
    }

    // ----------------------------------------------------------
    // Base expansion
    // ----------------------------------------------------------

    #[test]
    fn empty_file_order_yields_empty_sequence() {
        let pages = assemble(&[], &HashSet::new(), &InsertionMap::new(), |_| None);
        assert!(pages.is_empty());
    }

    #[test]
    fn base_files_expand_in_logical_order() {
        let a = FileId::new();
        let b = FileId::new();
        let meta = [(a, processed(2)), (b, processed(1))];
        let selected: HashSet<FileId> = [a, b].into();

        let pages = assemble(&[b, a], &selected, &InsertionMap::new(), metadata_map(&meta));
        assert_eq!(sources(&pages), vec![(b, 1), (a, 1), (a, 2)]);
        assert_eq!(numbers(&pages), vec![1, 2, 3]);
    }

    #[test]
    fn deselected_file_collapses_to_one_placeholder() {
        let a = FileId::new();
        let b = FileId::new();
        let meta = [(a, processed(3)), (b, processed(2))];
        let selected: HashSet<FileId> = [a].into();

        let pages = assemble(&[a, b], &selected, &InsertionMap::new(), metadata_map(&meta));
        // B contributes exactly one placeholder: totalPages drops by
        // (originalCount - 1).
        assert_eq!(pages.len(), 4);
        let b_pages: Vec<&PageDescriptor> =
            pages.iter().filter(|p| p.original_file_id == b).collect();
        assert_eq!(b_pages.len(), 1);
        assert!(b_pages[0].is_placeholder);
    }

    #[test]
    fn reselection_restores_full_expansion() {
        let b = FileId::new();
        let meta = [(b, processed(2))];

        let collapsed = assemble(&[b], &HashSet::new(), &InsertionMap::new(), metadata_map(&meta));
        assert_eq!(collapsed.len(), 1);

        let selected: HashSet<FileId> = [b].into();
        let expanded = assemble(&[b], &selected, &InsertionMap::new(), metadata_map(&meta));
        assert_eq!(expanded.len(), 2);
        assert!(expanded.iter().all(|p| !p.is_placeholder));
    }

    #[test]
    fn missing_metadata_yields_pending_placeholder() {
        let a = FileId::new();
        let selected: HashSet<FileId> = [a].into();

        let pages = assemble(&[a], &selected, &InsertionMap::new(), |_| None);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_placeholder);
        assert_eq!(pages[0].original_page_number, 1);
    }

    #[test]
    fn probed_file_expands_to_approximate_count() {
        let a = FileId::new();
        let meta = [(
            a,
            ProcessingState::Placeholder {
                probe_generation: 0,
                page_count: 4,
            },
        )];
        let selected: HashSet<FileId> = [a].into();

        let pages = assemble(&[a], &selected, &InsertionMap::new(), metadata_map(&meta));
        assert_eq!(pages.len(), 4);
        assert!(pages.iter().all(|p| p.is_placeholder));
    }

    #[test]
    fn real_pages_carry_rotation_and_split() {
        let a = FileId::new();
        let meta = [(
            a,
            ProcessingState::Processed {
                metadata: PageMetadata {
                    pages: vec![
                        PageInfo {
                            rotation: 90,
                            split_after: true,
                            thumbnail: Some("t1".into()),
                        },
                        PageInfo::default(),
                    ],
                },
            },
        )];
        let selected: HashSet<FileId> = [a].into();

        let pages = assemble(&[a], &selected, &InsertionMap::new(), metadata_map(&meta));
        assert_eq!(pages[0].rotation, 90);
        assert!(pages[0].split_after);
        assert_eq!(pages[0].thumbnail.as_deref(), Some("t1"));
        assert_eq!(pages[1].rotation, 0);
    }

    // ----------------------------------------------------------
    // Insertions
    // ----------------------------------------------------------

    /// The canonical case: A(3 pages), B(2 pages), B spliced after A's
    /// page 2 gives [A1, A2, B1, B2, A3] renumbered 1..5.
    #[test]
    fn insertion_splices_after_anchor() {
        let a = FileId::new();
        let b = FileId::new();
        let meta = [(a, processed(3)), (b, processed(2))];
        let selected: HashSet<FileId> = [a, b].into();

        let anchor = PageId::derive(a, 0, 2);
        let mut insertions = InsertionMap::new();
        insertions.push(anchor, vec![b]);

        let pages = assemble(&[a, b], &selected, &insertions, metadata_map(&meta));
        assert_eq!(
            sources(&pages),
            vec![(a, 1), (a, 2), (b, 1), (b, 2), (a, 3)]
        );
        assert_eq!(numbers(&pages), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn removing_insertion_restores_base_order() {
        let a = FileId::new();
        let b = FileId::new();
        let meta = [(a, processed(3)), (b, processed(2))];
        let selected: HashSet<FileId> = [a, b].into();

        let pages = assemble(&[a, b], &selected, &InsertionMap::new(), metadata_map(&meta));
        assert_eq!(
            sources(&pages),
            vec![(a, 1), (a, 2), (a, 3), (b, 1), (b, 2)]
        );
    }

    #[test]
    fn dangling_anchor_drops_insertion_silently() {
        let a = FileId::new();
        let b = FileId::new();
        let meta = [(a, processed(3)), (b, processed(2))];
        let selected: HashSet<FileId> = [a, b].into();

        // Anchor a page A never produces.
        let mut insertions = InsertionMap::new();
        insertions.push(PageId::derive(a, 0, 99), vec![b]);

        let with_dangling = assemble(&[a, b], &selected, &insertions, metadata_map(&meta));
        let without = assemble(&[a, b], &selected, &InsertionMap::new(), metadata_map(&meta));

        // B was excluded from the base walk as an insertion source, and its
        // insertion was dropped; the result matches the assembly computed
        // with that insertion entry absent except for B's base expansion.
        assert_eq!(
            sources(&with_dangling),
            vec![(a, 1), (a, 2), (a, 3)]
        );
        assert_eq!(without.len(), 5);
    }

    #[test]
    fn same_anchor_insertions_land_in_entry_order() {
        let a = FileId::new();
        let b = FileId::new();
        let c = FileId::new();
        let meta = [(a, processed(2)), (b, processed(1)), (c, processed(1))];
        let selected: HashSet<FileId> = [a, b, c].into();

        let anchor = PageId::derive(a, 0, 1);
        let mut insertions = InsertionMap::new();
        insertions.push(anchor, vec![b]);
        insertions.push(anchor, vec![c]);

        let pages = assemble(&[a, b, c], &selected, &insertions, metadata_map(&meta));
        // Later insertions at the same anchor land further from it.
        assert_eq!(
            sources(&pages),
            vec![(a, 1), (b, 1), (c, 1), (a, 2)]
        );
    }

    #[test]
    fn insertion_can_anchor_on_previously_spliced_page() {
        let a = FileId::new();
        let b = FileId::new();
        let c = FileId::new();
        let meta = [(a, processed(2)), (b, processed(1)), (c, processed(1))];
        let selected: HashSet<FileId> = [a, b, c].into();

        let mut insertions = InsertionMap::new();
        insertions.push(PageId::derive(a, 0, 1), vec![b]);
        // Anchored on B's spliced page, which exists by the time this entry
        // is applied.
        insertions.push(PageId::derive(b, 0, 1), vec![c]);

        let pages = assemble(&[a], &selected, &insertions, metadata_map(&meta));
        assert_eq!(
            sources(&pages),
            vec![(a, 1), (b, 1), (c, 1), (a, 2)]
        );
    }

    #[test]
    fn repeated_insertion_source_expands_independently() {
        let a = FileId::new();
        let b = FileId::new();
        let meta = [(a, processed(2)), (b, processed(1))];
        let selected: HashSet<FileId> = [a, b].into();

        let mut insertions = InsertionMap::new();
        insertions.push(PageId::derive(a, 0, 1), vec![b]);
        insertions.push(PageId::derive(a, 0, 2), vec![b]);

        let pages = assemble(&[a, b], &selected, &insertions, metadata_map(&meta));
        assert_eq!(
            sources(&pages),
            vec![(a, 1), (b, 1), (a, 2), (b, 1)]
        );
        // Each appearance got a distinct occurrence ordinal, so ids stay
        // unique within the document.
        let ids: HashSet<PageId> = pages.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), pages.len());
    }

    #[test]
    fn insertion_at_last_page_appends_at_end() {
        let a = FileId::new();
        let b = FileId::new();
        let meta = [(a, processed(2)), (b, processed(1))];
        let selected: HashSet<FileId> = [a, b].into();

        let mut insertions = InsertionMap::new();
        insertions.push(PageId::derive(a, 0, 2), vec![b]);

        let pages = assemble(&[a, b], &selected, &insertions, metadata_map(&meta));
        assert_eq!(sources(&pages), vec![(a, 1), (a, 2), (b, 1)]);
    }

    #[test]
    fn insertion_with_empty_file_list_is_a_no_op() {
        let a = FileId::new();
        let meta = [(a, processed(2))];
        let selected: HashSet<FileId> = [a].into();

        let mut insertions = InsertionMap::new();
        insertions.push(PageId::derive(a, 0, 1), vec![]);

        let pages = assemble(&[a], &selected, &insertions, metadata_map(&meta));
        assert_eq!(pages.len(), 2);
    }

    // ----------------------------------------------------------
    // Determinism
    // ----------------------------------------------------------

    #[test]
    fn assembly_is_idempotent() {
        let a = FileId::new();
        let b = FileId::new();
        let meta = [(a, processed(3)), (b, processed(2))];
        let selected: HashSet<FileId> = [a, b].into();
        let mut insertions = InsertionMap::new();
        insertions.push(PageId::derive(a, 0, 2), vec![b]);

        let first = assemble(&[a, b], &selected, &insertions, metadata_map(&meta));
        let second = assemble(&[a, b], &selected, &insertions, metadata_map(&meta));
        assert_eq!(first, second);
    }

    #[test]
    fn unrelated_selection_change_preserves_other_ids() {
        let a = FileId::new();
        let b = FileId::new();
        let meta = [(a, processed(2)), (b, processed(2))];

        let both: HashSet<FileId> = [a, b].into();
        let only_a: HashSet<FileId> = [a].into();

        let before = assemble(&[a, b], &both, &InsertionMap::new(), metadata_map(&meta));
        let after = assemble(&[a, b], &only_a, &InsertionMap::new(), metadata_map(&meta));

        let a_ids_before: Vec<PageId> = before
            .iter()
            .filter(|p| p.original_file_id == a)
            .map(|p| p.id)
            .collect();
        let a_ids_after: Vec<PageId> = after
            .iter()
            .filter(|p| p.original_file_id == a)
            .map(|p| p.id)
            .collect();
        assert_eq!(a_ids_before, a_ids_after);
    }

    proptest! {
        #[test]
        fn numbering_is_always_contiguous(
            page_counts in proptest::collection::vec(1u32..5, 0..6),
            selection_mask in proptest::collection::vec(proptest::bool::ANY, 0..6),
        ) {
            let files: Vec<FileId> = page_counts.iter().map(|_| FileId::new()).collect();
            let meta: Vec<(FileId, ProcessingState)> = files
                .iter()
                .zip(&page_counts)
                .map(|(f, c)| (*f, processed(*c)))
                .collect();
            let selected: HashSet<FileId> = files
                .iter()
                .zip(selection_mask.iter().chain(std::iter::repeat(&true)))
                .filter(|(_, keep)| **keep)
                .map(|(f, _)| *f)
                .collect();

            let pages = assemble(&files, &selected, &InsertionMap::new(), metadata_map(&meta));
            let expected: Vec<u32> = (1..=pages.len() as u32).collect();
            prop_assert_eq!(numbers(&pages), expected);

            // Same inputs, same output.
            let again = assemble(&files, &selected, &InsertionMap::new(), metadata_map(&meta));
            prop_assert_eq!(pages, again);
        }
    }
}
