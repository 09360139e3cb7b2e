use serde::{Deserialize, Serialize};

use crate::page::PageMetadata;

/// Per-file processing state.
///
/// A file moves through these states exactly once per version:
/// `Unprocessed` on import, `Placeholder` once a quick page-count probe has
/// resolved, `Processed` once real page metadata is available. Assembly
/// expands each state differently, so consumers never null-check optional
/// metadata fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingState {
    /// No page information yet; expands to a single placeholder page.
    Unprocessed,
    /// A quick probe returned an approximate page count; expands to that
    /// many placeholder pages.
    Placeholder {
        /// Generation of the probe that produced this count. Results from
        /// earlier generations are discarded.
        probe_generation: u64,
        /// Approximate page count, always at least 1.
        page_count: u32,
    },
    /// Real page metadata is available.
    Processed { metadata: PageMetadata },
}

impl ProcessingState {
    /// Returns `true` once real page metadata is available.
    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Processed { .. })
    }

    /// The number of pages this state expands to when selected.
    pub fn expanded_page_count(&self) -> u32 {
        match self {
            Self::Unprocessed => 1,
            Self::Placeholder { page_count, .. } => (*page_count).max(1),
            Self::Processed { metadata } => metadata.page_count(),
        }
    }
}

impl Default for ProcessingState {
    fn default() -> Self {
        Self::Unprocessed
    }
}
