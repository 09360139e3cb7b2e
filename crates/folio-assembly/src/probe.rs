//! Generation-tagged quick probes and placeholder synthesis.

use std::collections::HashMap;

use tracing::{debug, warn};

use folio_types::{FileId, PageDescriptor, ProcessingState};

use crate::error::ProbeError;

/// External quick page-count analyzer.
///
/// Expected to return quickly and approximately. Any failure is non-fatal
/// to assembly; the caller degrades to a single placeholder page.
pub trait PageCountProbe: Send + Sync {
    fn probe(&self, bytes: &[u8]) -> Result<u32, ProbeError>;
}

/// Tag identifying one in-flight probe.
///
/// Pairs the record id with the generation current when the probe started.
/// A result delivered with an outdated generation is discarded
/// unconditionally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeTicket {
    pub file_id: FileId,
    pub generation: u64,
}

/// Synthesizes provisional page state for records whose real page metadata
/// is not yet available.
///
/// Tracks a generation counter per record id. If the record changes while a
/// probe is in flight, [`invalidate`] bumps the generation and the stale
/// result arriving later is dropped without effect.
///
/// [`invalidate`]: PlaceholderGenerator::invalidate
#[derive(Debug, Default)]
pub struct PlaceholderGenerator {
    generations: HashMap<FileId, u64>,
}

impl PlaceholderGenerator {
    /// Create a generator with no tracked records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a probe for a record, tagging it with the current generation.
    pub fn begin(&mut self, file_id: FileId) -> ProbeTicket {
        let generation = *self.generations.entry(file_id).or_insert(0);
        ProbeTicket {
            file_id,
            generation,
        }
    }

    /// Bump the generation for a record, invalidating in-flight probes.
    ///
    /// Called when the record changes before a probe resolves. Returns the
    /// new generation.
    pub fn invalidate(&mut self, file_id: FileId) -> u64 {
        let generation = self.generations.entry(file_id).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Drop all generation state for a removed record.
    pub fn forget(&mut self, file_id: FileId) {
        self.generations.remove(&file_id);
    }

    /// The current generation for a record.
    pub fn current_generation(&self, file_id: FileId) -> u64 {
        self.generations.get(&file_id).copied().unwrap_or(0)
    }

    /// Accept or discard a resolved probe.
    ///
    /// Returns `None` for stale tickets (the record changed since the probe
    /// started). A probe failure degrades to a one-page placeholder state
    /// rather than failing the assembly; it is logged and recovered here.
    pub fn accept(
        &self,
        ticket: &ProbeTicket,
        outcome: Result<u32, ProbeError>,
    ) -> Option<ProcessingState> {
        let current = self.current_generation(ticket.file_id);
        if ticket.generation < current {
            debug!(
                file = %ticket.file_id.short_id(),
                ticket = ticket.generation,
                current,
                "discarding stale probe result"
            );
            return None;
        }

        let page_count = match outcome {
            Ok(count) => count.max(1),
            Err(err) => {
                warn!(
                    file = %ticket.file_id.short_id(),
                    error = %err,
                    "page-count probe failed; falling back to one placeholder page"
                );
                1
            }
        };

        Some(ProcessingState::Placeholder {
            probe_generation: ticket.generation,
            page_count,
        })
    }

    /// Synthesize `max(1, count)` placeholder descriptors for a record.
    pub fn placeholder_pages(file_id: FileId, count: u32) -> Vec<PageDescriptor> {
        (1..=count.max(1))
            .map(|n| PageDescriptor::placeholder(file_id, 0, n))
            .collect()
    }
}
