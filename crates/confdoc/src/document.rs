//! The stateful file wrapper: load, path-addressed edits, atomic save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, Item, Table, TableLike, Value};
use tracing::{debug, warn};

use crate::atomic::atomic_replace;
use crate::error::{DocumentError, Result};
use crate::path;
use crate::state::DocState;

/// Comment placed at the top of a freshly created document.
const DEFAULT_COMMENT: &str = "config file";

/// Signal returned by a [`ConfigDocument::transform`] closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeEdit {
    /// The closure modified the tree; the document must be saved.
    Changed,
    /// The closure made no changes after all.
    Unchanged,
}

/// A configuration file whose formatting survives programmatic edits.
///
/// Wraps one on-disk TOML file and one in-memory order/comment-preserving
/// tree. Comments, key ordering, and blank lines of any part not explicitly
/// modified round-trip byte-for-byte, so machine-made edits to a
/// version-controlled file produce minimal diffs.
///
/// Construction loads the file immediately. A missing file is not an error:
/// a fresh empty document is synthesized and written out on the first save.
/// A file that fails to parse leaves the document *corrupted* -- readable
/// (every lookup is absent) but refusing all modification until a reload
/// succeeds -- so callers can surface the diagnostic instead of crashing.
///
/// Saves go through a write-to-temp-then-rename replacement and only touch
/// the disk while there are unsaved changes.
///
/// # Examples
///
/// ```
/// use confdoc::ConfigDocument;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("app.toml");
///
/// let mut doc = ConfigDocument::open(&path).unwrap();
/// doc.set_value("server.http", "port", 8080_i64).unwrap();
/// doc.save().unwrap();
///
/// let doc = ConfigDocument::open(&path).unwrap();
/// assert_eq!(doc.get_i64("server.http", "port"), Some(8080));
/// ```
pub struct ConfigDocument {
    /// Filesystem location, fixed at construction.
    path: PathBuf,
    /// The in-memory preserving tree. Owned exclusively; lent to callers
    /// only for the duration of an accessor or transform call.
    doc: DocumentMut,
    state: DocState,
    /// Leading comment text for freshly synthesized documents.
    default_comment: String,
    /// Set while the current tree was synthesized fresh (file absent or
    /// empty); rendered ahead of the tree on save. Cleared by any load
    /// that parsed real content, at which point the comment lives in the
    /// file itself and round-trips through the parser.
    synthesized_comment: Option<String>,
}

impl ConfigDocument {
    /// Open the document at `path`, loading it immediately.
    ///
    /// A missing file is not an error; any other read failure propagates.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_comment(path, DEFAULT_COMMENT)
    }

    /// Open with a custom leading comment for freshly created files.
    pub fn open_with_comment(path: impl Into<PathBuf>, default_comment: &str) -> Result<Self> {
        let mut doc = Self {
            path: path.into(),
            doc: DocumentMut::new(),
            state: DocState::Clean,
            default_comment: default_comment.to_string(),
            synthesized_comment: None,
        };
        doc.reload()?;
        Ok(doc)
    }

    // -----------------------------------------------------------------------
    // Load / save
    // -----------------------------------------------------------------------

    /// Re-read the file from disk, discarding any unsaved changes.
    ///
    /// A missing or empty file yields a fresh dirty document. Content that
    /// fails to parse does not fail the call: the document becomes
    /// corrupted and the diagnostic is kept for display, so callers always
    /// get a document back to inspect. Only I/O errors other than
    /// "not found" propagate.
    pub fn reload(&mut self) -> Result<()> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => self.reset_fresh(),
            Ok(contents) => match contents.parse::<DocumentMut>() {
                Ok(doc) => {
                    self.doc = doc;
                    self.state = DocState::Clean;
                    self.synthesized_comment = None;
                    debug!(path = %self.path.display(), "loaded document");
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!(path = %self.path.display(), error = %message, "document failed to parse");
                    // Keep an empty tree so reads stay safe; every mutator
                    // checks the state before touching it.
                    self.doc = DocumentMut::new();
                    self.synthesized_comment = None;
                    self.state = DocState::Corrupted { message };
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.reset_fresh(),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Write the document back to its file, only if there are unsaved
    /// changes.
    ///
    /// Fails without writing while corrupted. The parent directory is
    /// created if missing (success if it already exists). The write goes
    /// through [`atomic_replace`], so a concurrent reader never observes a
    /// partial file. On I/O failure the error propagates and the document
    /// stays dirty, as if the save were never attempted.
    pub fn save(&mut self) -> Result<()> {
        self.check_modifiable()?;
        if !self.state.is_dirty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = self.render();
        atomic_replace(&self.path, contents.as_bytes())?;
        self.state = DocState::Clean;
        debug!(path = %self.path.display(), bytes = contents.len(), "saved document");
        Ok(())
    }

    /// Install a fresh empty tree carrying the default leading comment.
    fn reset_fresh(&mut self) {
        self.doc = DocumentMut::new();
        self.synthesized_comment = Some(self.default_comment.clone());
        self.state = DocState::Dirty;
        debug!(path = %self.path.display(), "synthesized fresh document");
    }

    /// Serialized document text, with the synthesized leading comment (if
    /// any) ahead of the tree.
    fn render(&self) -> String {
        match &self.synthesized_comment {
            Some(comment) => {
                let mut out = String::new();
                for line in comment.lines() {
                    out.push_str("# ");
                    out.push_str(line);
                    out.push('\n');
                }
                out.push_str(&self.doc.to_string());
                out
            }
            None => self.doc.to_string(),
        }
    }

    /// Fail with the stored corruption diagnostic if the document cannot
    /// be modified.
    fn check_modifiable(&self) -> Result<()> {
        match self.state.corruption_message() {
            Some(message) => Err(DocumentError::Corrupted {
                path: self.path.clone(),
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Path-addressed accessors
    // -----------------------------------------------------------------------

    /// The node at the dot-separated `path`, or `None` if any segment is
    /// missing. Read-only; never creates intermediate structure.
    pub fn section(&self, path: &str) -> Option<&Item> {
        path::lookup(self.doc.as_table(), path)
    }

    /// The table at `path`, creating an empty table at every missing
    /// segment. Creating any segment marks the document dirty.
    pub fn ensure_section(&mut self, path: &str) -> Result<&mut dyn TableLike> {
        self.check_modifiable()?;
        let (table, created) = path::lookup_or_create(self.doc.as_table_mut(), path)?;
        if created > 0 {
            self.state.mark_dirty();
        }
        Ok(table)
    }

    /// Set every `(key, value)` pair on the section at `path`, creating
    /// the section if needed.
    ///
    /// Setting any entry marks the document dirty even when the new value
    /// equals the old one: a set call is recorded as a modification rather
    /// than diffed away, so a later save always runs.
    pub fn set_values<I, K, V>(&mut self, path: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.check_modifiable()?;
        let (table, created) = path::lookup_or_create(self.doc.as_table_mut(), path)?;
        let mut wrote = false;
        for (key, value) in values {
            table.insert(key.as_ref(), Item::Value(value.into()));
            wrote = true;
        }
        if created > 0 || wrote {
            self.state.mark_dirty();
        }
        Ok(())
    }

    /// Set a single `key` on the section at `path`, creating the section
    /// if needed. Always marks the document dirty.
    pub fn set_value(&mut self, path: &str, key: &str, value: impl Into<Value>) -> Result<()> {
        self.check_modifiable()?;
        let (table, _) = path::lookup_or_create(self.doc.as_table_mut(), path)?;
        table.insert(key, Item::Value(value.into()));
        self.state.mark_dirty();
        Ok(())
    }

    /// The value of `key` within the section at `path`. Absent section or
    /// key yields `None`; pair with `unwrap_or` for a caller-side default.
    ///
    /// Reads are unrestricted: they work even while the document is
    /// corrupted (the tree is then empty, so every lookup is absent).
    pub fn get(&self, path: &str, key: &str) -> Option<&Item> {
        self.section(path)?.as_table_like()?.get(key)
    }

    /// String value at `path`/`key`, if present and a string.
    pub fn get_str(&self, path: &str, key: &str) -> Option<&str> {
        self.get(path, key)?.as_str()
    }

    /// Integer value at `path`/`key`, if present and an integer.
    pub fn get_i64(&self, path: &str, key: &str) -> Option<i64> {
        self.get(path, key)?.as_integer()
    }

    /// Boolean value at `path`/`key`, if present and a boolean.
    pub fn get_bool(&self, path: &str, key: &str) -> Option<bool> {
        self.get(path, key)?.as_bool()
    }

    // -----------------------------------------------------------------------
    // Transform escape hatch
    // -----------------------------------------------------------------------

    /// Hand the mutable tree to `f` for edits the path-addressed accessors
    /// cannot express: deleting a key, reordering, editing comments.
    ///
    /// The tree is lent for the duration of the call only. The document is
    /// marked dirty unless the closure reports [`TreeEdit::Unchanged`].
    pub fn transform<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Table) -> TreeEdit,
    {
        self.check_modifiable()?;
        if f(self.doc.as_table_mut()) == TreeEdit::Changed {
            self.state.mark_dirty();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read-only properties
    // -----------------------------------------------------------------------

    /// Filesystem location backing this document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the in-memory tree has changes a save would persist.
    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    /// Whether the on-disk content failed to parse. A corrupted document
    /// serves reads but refuses every mutation until a reload succeeds.
    pub fn is_corrupted(&self) -> bool {
        self.state.is_corrupted()
    }

    /// The parser diagnostic for a corrupted document.
    pub fn corruption_message(&self) -> Option<&str> {
        self.state.corruption_message()
    }
}

impl std::fmt::Debug for ConfigDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigDocument")
            .field("path", &self.path)
            .field("state", &self.state)
            .finish()
    }
}
