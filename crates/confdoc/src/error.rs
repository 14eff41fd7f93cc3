//! Error types for document operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, editing, or saving a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// I/O failure reading or writing the underlying file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The on-disk content failed to parse. The document stays readable
    /// (every lookup is absent) but all mutating calls fail with this
    /// error until a reload succeeds. Carries the parser diagnostic so
    /// callers can show the user what to fix by hand.
    #[error("cannot modify corrupted document {}: {message}", path.display())]
    Corrupted { path: PathBuf, message: String },

    /// A traversal segment holds a plain value where a section was
    /// required.
    #[error("not a section: segment {segment:?} of {path:?} holds a non-table value")]
    NotASection { path: String, segment: String },
}

/// Convenience type alias for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;
