//! Shared types for the upload → preview → scrub → download flow.
//!
//! A [`FileRecord`] is created for every [`UploadedFile`] handed to the
//! [`Session`](crate::session::Session) and lives until the user removes it.
//! Its [`FileStatus`] carries the cleaned bytes inside the `Completed`
//! variant, so "cleaned bytes exist if and only if the file completed" holds
//! by construction rather than by convention.

use crate::imaging::{Metadata, ScrubError};
use serde::Serialize;
use std::fmt;

/// Opaque identifier of a record inside one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FileId(u64);

impl FileId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A file as it arrives at the upload boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    /// Declared MIME type, e.g. `image/jpeg`. May be empty when unknown.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Processing state of a record.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Pending,
    Completed { cleaned: Vec<u8> },
    Error { reason: ScrubError },
}

impl FileStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, FileStatus::Pending)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::Completed { .. } => "completed",
            FileStatus::Error { .. } => "error",
        }
    }
}

/// One uploaded file and everything known about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    id: FileId,
    name: String,
    mime_type: String,
    size_bytes: u64,
    source: Vec<u8>,
    metadata: Option<Metadata>,
    pub(crate) status: FileStatus,
}

impl FileRecord {
    pub(crate) fn new(id: FileId, upload: UploadedFile, metadata: Option<Metadata>) -> Self {
        Self {
            id,
            size_bytes: upload.size_bytes(),
            name: upload.name,
            mime_type: upload.mime_type,
            source: upload.bytes,
            metadata,
            status: FileStatus::Pending,
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn source_bytes(&self) -> &[u8] {
        &self.source
    }

    /// Allow-listed tags found on upload, `None` when there was nothing to show.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn status(&self) -> &FileStatus {
        &self.status
    }

    pub fn cleaned_bytes(&self) -> Option<&[u8]> {
        match &self.status {
            FileStatus::Completed { cleaned } => Some(cleaned),
            _ => None,
        }
    }
}

/// A cleaned file ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Serializable view of a record, used by `inspect --json`.
#[derive(Debug, Serialize)]
pub struct RecordSummary<'a> {
    pub id: FileId,
    pub name: &'a str,
    pub mime_type: &'a str,
    pub size_bytes: u64,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a Metadata>,
}

impl<'a> From<&'a FileRecord> for RecordSummary<'a> {
    fn from(record: &'a FileRecord) -> Self {
        Self {
            id: record.id,
            name: &record.name,
            mime_type: &record.mime_type,
            size_bytes: record.size_bytes,
            status: record.status.label(),
            metadata: record.metadata.as_ref(),
        }
    }
}
