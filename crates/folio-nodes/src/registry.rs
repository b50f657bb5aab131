//! Per-editor registry of files awaiting upload.
//!
//! Placeholder nodes persist only a `file_id` attr; the bytes stay here
//! until the uploader consumes them. The registry and the document must
//! agree: exactly one live entry per live placeholder. [`crate::upload::reconcile`]
//! runs after every applied transaction to release entries whose
//! placeholder left the tree.

use std::collections::HashMap;

use bytes::Bytes;
use smol_str::SmolStr;
use tracing::{debug, warn};
use web_time::Instant;

/// Opaque handle tying a placeholder node to a registry entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileId(pub SmolStr);

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A file picked by the user, held in memory until upload.
#[derive(Clone, Debug)]
pub struct FileHandle {
    pub name: String,
    pub mime: String,
    pub bytes: Bytes,
}

struct Entry {
    handle: FileHandle,
    consumed: bool,
    registered_at: Instant,
}

/// Owned by a single editor instance; not shared across editors.
#[derive(Default)]
pub struct PendingUploads {
    entries: HashMap<FileId, Entry>,
    counter: u64,
}

impl PendingUploads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and mint the id its placeholder node will carry.
    pub fn register(&mut self, handle: FileHandle) -> FileId {
        self.counter += 1;
        let id = FileId(SmolStr::from(format!("file-{}", self.counter)));
        debug!(%id, name = %handle.name, mime = %handle.mime, "registered pending upload");
        self.entries.insert(
            id.clone(),
            Entry {
                handle,
                consumed: false,
                registered_at: Instant::now(),
            },
        );
        id
    }

    /// Look at an entry without taking it. Returns `None` once consumed.
    pub fn peek(&self, id: &FileId) -> Option<&FileHandle> {
        self.entries
            .get(id)
            .filter(|e| !e.consumed)
            .map(|e| &e.handle)
    }

    /// Take the file for upload. A second consume of the same id yields
    /// `None`; the entry itself stays until released so late events can
    /// still be correlated.
    pub fn consume(&mut self, id: &FileId) -> Option<FileHandle> {
        let entry = self.entries.get_mut(id)?;
        if entry.consumed {
            warn!(%id, "pending upload consumed twice");
            return None;
        }
        entry.consumed = true;
        Some(entry.handle.clone())
    }

    /// Drop an entry. Releasing an unknown or already-released id is a
    /// logged no-op.
    pub fn release(&mut self, id: &FileId) -> bool {
        if let Some(entry) = self.entries.remove(id) {
            debug!(%id, pending_ms = entry.registered_at.elapsed().as_millis(), "released pending upload");
            true
        } else {
            debug!(%id, "release of unknown pending upload ignored");
            false
        }
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of all live entries, consumed or not.
    pub fn ids(&self) -> Vec<FileId> {
        self.entries.keys().cloned().collect()
    }
}
