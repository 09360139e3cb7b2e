//! Foundation types for the Folio document engine.
//!
//! This crate provides the identifier, page, and document types used
//! throughout the Folio system. Every other Folio crate depends on
//! `folio-types`.
//!
//! # Key Types
//!
//! - [`FileId`] — Unique identifier for a stored document version (UUID v7)
//! - [`QuickKey`] — Cheap equality fingerprint for re-import detection
//! - [`PageId`] — Deterministic, recomputation-stable page identifier
//! - [`PageDescriptor`] — One page within a composite view
//! - [`PageMetadata`] — Real per-page data for a processed file
//! - [`ProcessingState`] — Tagged per-file processing state
//! - [`CompositeDocument`] — The assembled, ordered page sequence
//! - [`Signature`] — Fingerprint of the contributing file set

pub mod document;
pub mod error;
pub mod id;
pub mod page;
pub mod state;

pub use document::{CompositeDocument, Signature};
pub use error::TypeError;
pub use id::{FileId, QuickKey};
pub use page::{PageDescriptor, PageId, PageInfo, PageMetadata};
pub use state::ProcessingState;
