//! The per-session file list and the batch scrub.
//!
//! A [`Session`] owns every [`FileRecord`] and is the only thing that mutates
//! them:
//!
//! ```text
//! add_files      uploads → records (metadata preview read here, status Pending)
//! process_all    every Pending record → Completed | Error, in parallel
//! remove_file    record deleted, whatever its status
//! download       Completed record → cleaned_<name>
//! ```
//!
//! Each mutating call returns the updated snapshot of the list.
//!
//! ## Parallel processing
//!
//! `process_all` hands each pending record to a rayon worker as a disjoint
//! `&mut`, so workers never share state. A failing file, including one whose
//! decoder panics, only marks its own record as `Error`; the batch always
//! returns with every record resolved.

use crate::imaging::{ImageBackend, RustBackend, ScrubError};
use crate::naming;
use crate::types::{Download, FileId, FileRecord, FileStatus, UploadedFile};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No file with id {0}")]
    UnknownFile(FileId),
    #[error("File {0} has not been cleaned")]
    NotCompleted(FileId),
}

/// Progress reported while a batch runs, one event per scrubbed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrubEvent {
    Completed {
        id: FileId,
        name: String,
        bytes_in: u64,
        bytes_out: u64,
    },
    Failed {
        id: FileId,
        name: String,
        reason: String,
    },
}

/// Number of records per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.completed + self.failed
    }
}

pub struct Session<B: ImageBackend = RustBackend> {
    backend: B,
    records: Vec<FileRecord>,
    next_id: u64,
    prefix: String,
}

impl Session<RustBackend> {
    pub fn new() -> Self {
        Self::with_backend(RustBackend::new())
    }
}

impl Default for Session<RustBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ImageBackend> Session<B> {
    /// Session using a specific backend (allows testing with mock).
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            records: Vec::new(),
            next_id: 1,
            prefix: naming::DEFAULT_PREFIX.to_string(),
        }
    }

    /// Override the download name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn get(&self, id: FileId) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Create one pending record per upload, in order, reading each file's
    /// metadata preview on the way in.
    pub fn add_files<I>(&mut self, uploads: I) -> &[FileRecord]
    where
        I: IntoIterator<Item = UploadedFile>,
    {
        let uploads: Vec<UploadedFile> = uploads.into_iter().collect();
        let backend = &self.backend;
        let previews: Vec<_> = uploads
            .par_iter()
            .map(|u| backend.read_metadata(&u.bytes, &u.mime_type))
            .collect();

        for (upload, metadata) in uploads.into_iter().zip(previews) {
            let id = FileId::new(self.next_id);
            self.next_id += 1;
            tracing::debug!(
                %id,
                file = %upload.name,
                tags = metadata.as_ref().map_or(0, |m| m.len()),
                "added"
            );
            self.records.push(FileRecord::new(id, upload, metadata));
        }
        &self.records
    }

    /// Delete a record. Allowed in any state.
    pub fn remove_file(&mut self, id: FileId) -> Result<&[FileRecord], SessionError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(SessionError::UnknownFile(id))?;
        self.records.remove(index);
        Ok(&self.records)
    }

    /// Scrub every pending record. Completed and failed records are left alone.
    pub fn process_all(&mut self) -> &[FileRecord] {
        self.process_all_with_events(None)
    }

    /// [`process_all`](Self::process_all), reporting each file's outcome on
    /// `events` as soon as it is known.
    pub fn process_all_with_events(&mut self, events: Option<Sender<ScrubEvent>>) -> &[FileRecord] {
        let backend = &self.backend;
        let events = events.as_ref();

        self.records
            .par_iter_mut()
            .filter(|record| record.status.is_pending())
            .for_each(|record| {
                let status = scrub_record(backend, record);
                if let Some(tx) = events {
                    // A dropped receiver only means nobody is listening.
                    let _ = tx.send(event_for(record, &status));
                }
                record.status = status;
            });

        &self.records
    }

    /// The cleaned file of a completed record.
    pub fn download(&self, id: FileId) -> Result<Download, SessionError> {
        let record = self.get(id).ok_or(SessionError::UnknownFile(id))?;
        let cleaned = record
            .cleaned_bytes()
            .ok_or(SessionError::NotCompleted(id))?;
        Ok(Download {
            name: naming::cleaned_name(record.name(), &self.prefix),
            mime_type: record.mime_type().to_string(),
            bytes: cleaned.to_vec(),
        })
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for record in &self.records {
            match record.status() {
                FileStatus::Pending => counts.pending += 1,
                FileStatus::Completed { .. } => counts.completed += 1,
                FileStatus::Error { .. } => counts.failed += 1,
            }
        }
        counts
    }
}

fn scrub_record(backend: &impl ImageBackend, record: &FileRecord) -> FileStatus {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        backend.scrub(record.source_bytes(), record.mime_type(), record.name())
    }))
    .unwrap_or_else(|payload| Err(ScrubError::Decode(panic_message(payload.as_ref()))));

    match outcome {
        Ok(cleaned) => FileStatus::Completed { cleaned },
        Err(reason) => {
            tracing::warn!(id = %record.id(), file = %record.name(), "{reason}");
            FileStatus::Error { reason }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("decoder panicked: {detail}")
}

fn event_for(record: &FileRecord, status: &FileStatus) -> ScrubEvent {
    let id = record.id();
    let name = record.name().to_string();
    match status {
        FileStatus::Completed { cleaned } => ScrubEvent::Completed {
            id,
            name,
            bytes_in: record.size_bytes(),
            bytes_out: cleaned.len() as u64,
        },
        FileStatus::Error { reason } => ScrubEvent::Failed {
            id,
            name,
            reason: reason.to_string(),
        },
        FileStatus::Pending => unreachable!("scrub_record never returns Pending"),
    }
}
