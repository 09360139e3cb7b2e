//! The editing session context object.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use folio_assembly::{
    assemble, IdentityReconciler, InsertionMap, PageCountProbe, PlaceholderGenerator, ProbeError,
    ProbeTicket,
};
use folio_store::{RecordPatch, RecordStore, StoreError, StoreEvent};
use folio_types::{CompositeDocument, FileId, PageId, ProcessingState, Signature};

use crate::error::SessionResult;
use crate::view::{EditorView, VERY_LARGE_PAGE_THRESHOLD};

/// One editing session over a shared record store.
///
/// Owns everything a composite-document consumer needs: the store handle,
/// the editing inputs (file order, selection, insertions), the probe
/// generation tracker, and the reconciled document cache. There is no global
/// state; dropping the session tears all of it down and unsubscribes from
/// store events.
///
/// # Recomputation model
///
/// Mutators only mark the session dirty. [`tick`] drains every pending store
/// event, coalesces the burst into at most one recomputation, and reconciles
/// the result against the cached document so untouched pages keep their
/// identity. Consumers pull the outcome through [`view`]; nothing is pushed
/// mid-recomputation.
///
/// [`tick`]: EditorSession::tick
/// [`view`]: EditorSession::view
pub struct EditorSession<S: RecordStore> {
    store: Arc<S>,
    events: broadcast::Receiver<StoreEvent>,
    generator: PlaceholderGenerator,
    reconciler: IdentityReconciler,
    file_order: Vec<FileId>,
    selected: HashSet<FileId>,
    insertions: InsertionMap,
    dirty: bool,
}

impl<S: RecordStore> EditorSession<S> {
    /// Open a session over a store, subscribing to its events.
    pub fn new(store: Arc<S>) -> Self {
        let events = store.subscribe();
        Self {
            store,
            events,
            generator: PlaceholderGenerator::new(),
            reconciler: IdentityReconciler::new(),
            file_order: Vec::new(),
            selected: HashSet::new(),
            insertions: InsertionMap::new(),
            // The first tick must run one assembly even if no mutator has
            // fired yet, so a session opened purely for viewing still gets
            // a document.
            dirty: true,
        }
    }

    /// The shared store handle.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ---- mutators ----

    /// Replace the logical file order.
    pub fn set_file_order(&mut self, order: Vec<FileId>) {
        self.file_order = order;
        self.dirty = true;
    }

    /// Append a file to the order and select it.
    pub fn add_file(&mut self, id: FileId) {
        if !self.file_order.contains(&id) {
            self.file_order.push(id);
        }
        self.selected.insert(id);
        self.dirty = true;
    }

    /// Select a file for full expansion.
    pub fn select(&mut self, id: FileId) {
        self.selected.insert(id);
        self.dirty = true;
    }

    /// Deselect a file; it collapses to a single placeholder page.
    pub fn deselect(&mut self, id: FileId) {
        self.selected.remove(&id);
        self.dirty = true;
    }

    /// Splice the pages of `files` immediately after `anchor`.
    pub fn insert_after(&mut self, anchor: PageId, files: Vec<FileId>) {
        for &file in &files {
            self.selected.insert(file);
        }
        self.insertions.push(anchor, files);
        self.dirty = true;
    }

    /// Remove all insertions anchored at a page. Returns `true` if any
    /// existed.
    pub fn remove_insertion(&mut self, anchor: PageId) -> bool {
        let removed = self.insertions.remove(anchor);
        if removed {
            self.dirty = true;
        }
        removed
    }

    // ---- probes ----

    /// Start a page-count probe for a record.
    pub fn begin_probe(&mut self, file_id: FileId) -> ProbeTicket {
        self.generator.begin(file_id)
    }

    /// Deliver a probe result.
    ///
    /// An accepted result is written back through the store, so the session
    /// picks it up on the next tick like any other record change. Stale
    /// tickets and records deleted mid-probe are dropped without effect.
    /// Returns `true` if the result was applied.
    pub fn complete_probe(
        &mut self,
        ticket: ProbeTicket,
        outcome: Result<u32, ProbeError>,
    ) -> SessionResult<bool> {
        let Some(state) = self.generator.accept(&ticket, outcome) else {
            return Ok(false);
        };
        match self
            .store
            .update(ticket.file_id, RecordPatch::processing(state))
        {
            Ok(()) => Ok(true),
            Err(StoreError::NotFound(id)) => {
                debug!(file = %id.short_id(), "probed record is gone; dropping result");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Run a synchronous probe against a record's payload end to end.
    ///
    /// Returns `false` if the record is absent or the result was stale.
    /// Probe failures are recovered to a one-page placeholder, not errors.
    pub fn probe_file<P: PageCountProbe>(
        &mut self,
        probe: &P,
        file_id: FileId,
    ) -> SessionResult<bool> {
        let ticket = self.begin_probe(file_id);
        let Some(record) = self.store.get(file_id)? else {
            return Ok(false);
        };
        let outcome = probe.probe(&record.payload);
        self.complete_probe(ticket, outcome)
    }

    // ---- scheduling ----

    /// One cooperative scheduling tick.
    ///
    /// Drains all pending store events, then recomputes at most once if
    /// anything changed since the last tick. Returns `true` if a
    /// recomputation ran. The recomputation observes a snapshot of committed
    /// store state taken at the start of assembly.
    pub fn tick(&mut self) -> SessionResult<bool> {
        let mut changed = self.dirty;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    changed = true;
                    if let StoreEvent::RecordRemoved(id) = event {
                        self.drop_file(id);
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!(missed, "store event stream lagged; recomputing from snapshot");
                    changed = true;
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
        if !changed {
            return Ok(false);
        }
        self.recompute()?;
        self.dirty = false;
        Ok(true)
    }

    /// Current read-only view of the session.
    pub fn view(&self) -> EditorView<'_> {
        let document = self.reconciler.cached();
        let pending = document
            .map(|doc| {
                doc.pages()
                    .iter()
                    .any(|p| p.is_placeholder && self.selected.contains(&p.original_file_id))
            })
            .unwrap_or(!self.file_order.is_empty());
        EditorView {
            document,
            is_loading: self.dirty || pending,
            is_very_large: document
                .map(|doc| doc.total_pages() > VERY_LARGE_PAGE_THRESHOLD)
                .unwrap_or(false),
        }
    }

    // ---- internals ----

    /// Scrub a removed record out of the editing inputs and probe state.
    fn drop_file(&mut self, id: FileId) {
        self.generator.forget(id);
        self.file_order.retain(|f| *f != id);
        self.selected.remove(&id);
        self.insertions = self.insertions.retain_sources(|f| *f != id);
    }

    /// Snapshot committed store state and run one assemble + reconcile.
    fn recompute(&mut self) -> SessionResult<()> {
        let mut contributing: HashSet<FileId> = self.file_order.iter().copied().collect();
        contributing.extend(self.insertions.source_files());

        let mut states: HashMap<FileId, ProcessingState> = HashMap::new();
        for &id in &contributing {
            if let Some(stub) = self.store.get_stub(id)? {
                states.insert(id, stub.processing);
            }
        }

        let pages = assemble(&self.file_order, &self.selected, &self.insertions, |id| {
            states.get(&id).cloned()
        });
        let signature = Signature::of_file_set(contributing);
        let document = self
            .reconciler
            .reconcile(CompositeDocument::new(pages, signature));
        debug!(
            pages = document.total_pages(),
            files = self.file_order.len(),
            "recomputed composite document"
        );
        Ok(())
    }
}
