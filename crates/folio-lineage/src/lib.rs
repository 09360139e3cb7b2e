//! Version lineage tracking over a Folio record store.
//!
//! Records form a forest: each version points at its direct predecessor
//! through `parent_file_id` and at its lineage root through
//! `original_file_id`. This crate maintains the "leaf" (unconsumed) flags
//! over that forest and provides the walk and commit operations the tool
//! pipeline uses.
//!
//! # Invariants
//!
//! - Parent edges are acyclic; the store enforces this at write time.
//! - `original_file_id` is invariant across all descendants of a lineage.
//! - `root()` is an O(1) field read, never a graph walk.

pub mod error;
pub mod tracker;

pub use error::{LineageError, LineageResult};
pub use tracker::LineageTracker;
