//! Round-trip preserving configuration documents.
//!
//! `confdoc` wraps one on-disk TOML file in a stateful editor whose saves
//! keep the file's original formatting. Configuration files live in version
//! control, where a human author's comments, key ordering, and blank lines
//! matter: a machine-made edit must produce a minimal, readable diff, not a
//! re-serialization of the whole document.
//!
//! # Design Rules
//!
//! 1. Loading never fails on a missing file; a fresh document is
//!    synthesized and written out on the first save.
//! 2. Content that fails to parse leaves the document *corrupted*:
//!    readable, but refusing every mutation until a reload succeeds, so
//!    callers can show the diagnostic instead of crashing.
//! 3. Saves are atomic (write-to-temp-then-rename) and only happen while
//!    there are unsaved changes.
//! 4. Untouched parts of the tree round-trip byte-for-byte; only what a
//!    caller explicitly sets is reformatted.
//! 5. All I/O errors are propagated, never silently ignored.
//!
//! # Modules
//!
//! - [`atomic`] -- write-to-temp-then-rename file replacement
//! - [`document`] -- [`ConfigDocument`], the stateful file wrapper
//! - [`error`] -- error types for document operations

pub mod atomic;
pub mod document;
pub mod error;
mod path;
mod state;

pub use atomic::atomic_replace;
pub use document::{ConfigDocument, TreeEdit};
pub use error::{DocumentError, Result};

// Node types callers meet through the accessors and the transform hook.
pub use toml_edit::{Item, Table, TableLike, Value};
