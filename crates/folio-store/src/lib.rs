//! Versioned record storage for the Folio document engine.
//!
//! This crate persists binary document versions together with their lineage
//! metadata. Each [`StoredRecord`] is one immutable version of a logical
//! document: new tool output never mutates a record in place, it creates a
//! new version linked to its predecessor through `parent_file_id`.
//!
//! # Layout
//!
//! - [`StoredRecord`] / [`FileStub`] — full record vs. metadata-only
//!   projection for listing without loading payload bytes
//! - [`BlobStore`] — the durable blob substrate interface; the record store
//!   is a thin atomicity-guaranteeing wrapper over it
//! - [`RecordStore`] — the storage contract all backends implement
//! - [`InMemoryRecordStore`] — `HashMap`-based store for tests and embedding
//! - [`StoreEvent`] — typed change events on a broadcast channel
//!
//! # Design Rules
//!
//! 1. `store` is atomic: payload goes to the blob substrate first, metadata
//!    is committed only after the blob write succeeds. A record is either
//!    fully durable or absent.
//! 2. Quota exhaustion fails the write and leaves any prior value of that
//!    id retrievable unchanged.
//! 3. `get` on a missing id is `Ok(None)`, never an error.
//! 4. Parent pointers are validated at write time: a record whose ancestor
//!    chain would contain its own id is rejected.
//! 5. Every mutation emits exactly one [`StoreEvent`].

pub mod blob;
pub mod error;
pub mod event;
pub mod memory;
pub mod record;
pub mod traits;

pub use blob::{BlobStore, InMemoryBlobStore, UsageEstimate};
pub use error::{StoreError, StoreResult};
pub use event::StoreEvent;
pub use memory::InMemoryRecordStore;
pub use record::{FileStub, RecordPatch, StoredRecord};
pub use traits::RecordStore;
