//! Deterministic multi-document page assembly.
//!
//! This crate turns an ordered file list, a selection set, and an insertion
//! map into one composite page sequence, and keeps page identities stable
//! across recomputations so consumers relying on stable ids (animation,
//! drag state, cached thumbnails) never see pages "jump" when unrelated
//! state changes trigger a recompute.
//!
//! # Pieces
//!
//! - [`assemble`] — the pure assembly function
//! - [`InsertionMap`] — ordered anchor-to-files splice instructions
//! - [`PlaceholderGenerator`] / [`PageCountProbe`] — generation-tagged
//!   quick probes and placeholder synthesis for files without metadata
//! - [`IdentityReconciler`] — the `{Empty, Valid, Stale}` cache state
//!   machine that preserves descriptor identity between assemblies
//!
//! # Failure policy
//!
//! Assembly anomalies are well-defined degenerate outputs, never errors:
//! an empty file list yields an empty sequence, missing metadata yields a
//! placeholder page, and an insertion whose anchor is gone is dropped with
//! a log line. Only the probe has an error type, and it is always recovered
//! locally to a single placeholder page.

pub mod assemble;
pub mod error;
pub mod insertion;
pub mod probe;
pub mod reconcile;

pub use assemble::assemble;
pub use error::ProbeError;
pub use insertion::InsertionMap;
pub use probe::{PageCountProbe, PlaceholderGenerator, ProbeTicket};
pub use reconcile::{CacheState, IdentityReconciler};
