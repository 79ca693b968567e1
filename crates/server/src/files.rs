//! Uploaded attachment bytes, hosted so the provider can download them.
//!
//! The messaging provider only accepts files by URL, so an upload is kept
//! here and the staged [`Attachment`](herald_core::Attachment) points at
//! `{public_url}/files/{id}/{file_name}`.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use uuid::Uuid;

/// Characters left unescaped in the file-name path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Name the file was uploaded under.
    pub file_name: String,
    /// MIME type reported by the uploader.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Bytes,
}

/// In-memory store of uploaded files keyed by attachment id.
#[derive(Debug, Default)]
pub struct FileStore {
    files: RwLock<HashMap<Uuid, StoredFile>>,
}

impl FileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a file under `id`.
    pub fn insert(&self, id: Uuid, file: StoredFile) {
        self.files.write().insert(id, file);
    }

    /// Look up a file.
    pub fn get(&self, id: Uuid) -> Option<StoredFile> {
        self.files.read().get(&id).cloned()
    }

    /// Drop a file. Returns whether it existed.
    pub fn remove(&self, id: Uuid) -> bool {
        self.files.write().remove(&id).is_some()
    }

    /// Keep only the files whose id passes `keep`. Returns how many were dropped.
    pub fn retain(&self, mut keep: impl FnMut(&Uuid) -> bool) -> usize {
        let mut files = self.files.write();
        let before = files.len();
        files.retain(|id, _| keep(id));
        before - files.len()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

/// The URL under which the provider fetches an uploaded file.
pub fn file_url(public_url: &str, id: Uuid, file_name: &str) -> String {
    format!(
        "{}/files/{id}/{}",
        public_url.trim_end_matches('/'),
        utf8_percent_encode(file_name, PATH_SEGMENT)
    )
}
