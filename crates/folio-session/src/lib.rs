//! The editing session: one explicit context object per editing surface.
//!
//! Ties the other crates together: an [`EditorSession`] owns a shared
//! [`RecordStore`](folio_store::RecordStore) handle, subscribes to its
//! events, and keeps a reconciled
//! [`CompositeDocument`](folio_types::CompositeDocument) up to date through
//! cooperative [`tick`](EditorSession::tick) calls.
//!
//! # Key Types
//!
//! - [`EditorSession`] — the context object
//! - [`EditorView`] — the pull-based consumer snapshot
//! - [`SessionError`] — store failures surfaced to the caller
//!
//! # Design Rules
//!
//! - No global state: everything lives on the session and dies with it.
//! - Mutations never recompute inline; a tick coalesces any burst of
//!   changes into at most one recomputation.
//! - Consumers pull views; the session never pushes partial state.

pub mod error;
pub mod session;
pub mod view;

pub use error::{SessionError, SessionResult};
pub use session::EditorSession;
pub use view::{EditorView, VERY_LARGE_PAGE_THRESHOLD};
