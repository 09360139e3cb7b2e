//! Identity-preserving reconciliation of recomputed documents.
//!
//! Assembly is recomputed wholesale on every relevant change. Naively
//! replacing the cached document would hand consumers a fresh descriptor for
//! every page even when nothing about most pages changed. The reconciler
//! compares the fresh result against the cache and, when the page set is
//! unchanged, carries cached per-page data forward under the same ids.

use std::collections::HashMap;

use tracing::debug;

use folio_types::{CompositeDocument, PageDescriptor, PageId};

/// Validity of the cached document relative to a fresh assembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing cached yet.
    Empty,
    /// Same contributing-file signature and the same page id set; the cache
    /// can be reconciled field by field.
    Valid,
    /// The signature or the page set changed; the cache is replaced.
    Stale,
}

/// Caches the last assembled document and merges recomputations into it.
#[derive(Debug, Default)]
pub struct IdentityReconciler {
    cached: Option<CompositeDocument>,
}

impl IdentityReconciler {
    /// Create a reconciler with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently cached document, if any.
    pub fn cached(&self) -> Option<&CompositeDocument> {
        self.cached.as_ref()
    }

    /// Drop the cached document.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Classify the cache against a fresh assembly.
    ///
    /// Page identity comparison is set-based: reordering pages does not
    /// invalidate the cache, only adding or removing pages (or changing the
    /// contributing file set) does.
    pub fn classify(&self, fresh: &CompositeDocument) -> CacheState {
        match &self.cached {
            None => CacheState::Empty,
            Some(cached) => {
                if cached.signature() == fresh.signature()
                    && cached.page_id_set() == fresh.page_id_set()
                {
                    CacheState::Valid
                } else {
                    CacheState::Stale
                }
            }
        }
    }

    /// Fold a fresh assembly into the cache and return the result.
    ///
    /// A `Valid` cache is merged page by page: each fresh descriptor keeps
    /// its recomputed position and processing fields, while a cached
    /// thumbnail survives until a fresh one replaces it. `Empty` and `Stale`
    /// caches are replaced with the fresh document as-is. Page numbers are
    /// never taken from the cache.
    pub fn reconcile(&mut self, fresh: CompositeDocument) -> &CompositeDocument {
        let state = self.classify(&fresh);
        let next = match (&self.cached, state) {
            (Some(cached), CacheState::Valid) => {
                debug!(
                    pages = fresh.total_pages(),
                    "reconciling recomputed document against valid cache"
                );
                let by_id: HashMap<PageId, &PageDescriptor> =
                    cached.pages().iter().map(|p| (p.id, p)).collect();
                let pages = fresh
                    .pages()
                    .iter()
                    .map(|page| match by_id.get(&page.id) {
                        Some(previous) => merge_descriptor(previous, page),
                        None => page.clone(),
                    })
                    .collect();
                CompositeDocument::new(pages, *fresh.signature())
            }
            _ => {
                debug!(
                    pages = fresh.total_pages(),
                    ?state,
                    "replacing cached document"
                );
                fresh
            }
        };
        self.cached.insert(next)
    }
}

/// Merge one page across a recomputation.
///
/// The fresh descriptor wins for everything derived from current state,
/// including placeholder resolution. Only the thumbnail is carried forward
/// from the cache when the fresh page has none, so an already rendered
/// thumbnail does not flicker away during recomputation.
fn merge_descriptor(cached: &PageDescriptor, fresh: &PageDescriptor) -> PageDescriptor {
    let mut merged = fresh.clone();
    if merged.thumbnail.is_none() {
        merged.thumbnail = cached.thumbnail.clone();
    }
    merged
}
