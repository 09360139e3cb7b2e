use folio_types::CompositeDocument;

/// Page count above which consumers should switch to degraded rendering
/// (virtualized lists, no eager thumbnails).
pub const VERY_LARGE_PAGE_THRESHOLD: usize = 2000;

/// Read-only snapshot of the session for consumers.
///
/// Borrowed from the session; pulled on demand rather than pushed, so a
/// consumer always observes a fully reconciled document, never an
/// intermediate state.
#[derive(Debug)]
pub struct EditorView<'a> {
    /// The current composite document, or `None` before the first
    /// recomputation.
    pub document: Option<&'a CompositeDocument>,
    /// True while the document still contains pages awaiting real metadata,
    /// or a recomputation is pending.
    pub is_loading: bool,
    /// True once the document crosses [`VERY_LARGE_PAGE_THRESHOLD`].
    pub is_very_large: bool,
}

impl EditorView<'_> {
    /// Total pages in the current document, zero if none.
    pub fn total_pages(&self) -> usize {
        self.document.map(|d| d.total_pages()).unwrap_or(0)
    }
}
