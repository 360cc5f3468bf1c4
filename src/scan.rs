//! Upload collection from the filesystem.
//!
//! The CLI accepts any mix of files and directories and normalizes them into
//! one ordered sequence of [`UploadedFile`]s, the same shape a file picker or
//! drag-and-drop would produce:
//!
//! - **File arguments** are taken as given, in argument order, whatever
//!   their extension. The MIME type comes from the extension and is left
//!   empty when unknown.
//! - **Directory arguments** are walked (top level only unless `recursive`)
//!   and contribute their supported images, sorted by path. Files whose
//!   name starts with the output prefix are earlier results and are left out.
//! - Files above the size ceiling are skipped with a warning, not an error.
//! - The same path given twice is only uploaded once.

use crate::imaging::{mime_for_path, supported_extensions};
use crate::types::UploadedFile;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Path not found: {0}")]
    NotFound(PathBuf),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// An upload together with where it came from.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub upload: UploadedFile,
}

/// A file left out of the upload set, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub limit: u64,
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<ScannedFile>,
    pub skipped: Vec<Skipped>,
}

impl ScanResult {
    /// Split into source paths and uploads, index for index. The uploads
    /// are moved out so file contents are held only once.
    pub fn into_parts(self) -> (Vec<PathBuf>, Vec<UploadedFile>) {
        self.files.into_iter().map(|f| (f.path, f.upload)).unzip()
    }
}

/// Collect uploads from `paths`.
///
/// `skip_prefix` names the files a previous run produced; walked entries
/// starting with it are ignored. An empty prefix skips nothing.
pub fn collect(
    paths: &[PathBuf],
    recursive: bool,
    max_file_size: u64,
    skip_prefix: &str,
) -> Result<ScanResult, ScanError> {
    let mut candidates = Vec::new();
    for path in paths {
        if path.is_dir() {
            candidates.extend(walk_images(path, recursive, skip_prefix)?);
        } else if path.is_file() {
            candidates.push(path.clone());
        } else {
            return Err(ScanError::NotFound(path.clone()));
        }
    }

    let mut seen = HashSet::new();
    let mut result = ScanResult::default();
    for path in candidates {
        if !seen.insert(path.clone()) {
            continue;
        }
        let size_bytes = fs::metadata(&path)?.len();
        if size_bytes > max_file_size {
            tracing::warn!(path = %path.display(), size_bytes, "skipping file above size limit");
            result.skipped.push(Skipped {
                path,
                size_bytes,
                limit: max_file_size,
            });
            continue;
        }
        let upload = read_upload(&path)?;
        result.files.push(ScannedFile { path, upload });
    }
    Ok(result)
}

/// Read one file into an upload.
pub fn read_upload(path: &Path) -> Result<UploadedFile, ScanError> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime = mime_for_path(path).unwrap_or("");
    Ok(UploadedFile::new(name, mime, bytes))
}

fn walk_images(dir: &Path, recursive: bool, skip_prefix: &str) -> Result<Vec<PathBuf>, ScanError> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images = Vec::new();
    for entry in WalkDir::new(dir).max_depth(max_depth).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_supported_image(entry.path()) {
            continue;
        }
        if is_previous_output(entry.file_name().to_string_lossy().as_ref(), skip_prefix) {
            tracing::debug!(path = %entry.path().display(), "skipping earlier output");
            continue;
        }
        images.push(entry.into_path());
    }
    Ok(images)
}

fn is_previous_output(file_name: &str, prefix: &str) -> bool {
    !prefix.is_empty() && file_name.starts_with(prefix)
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| supported_extensions().any(|s| s.eq_ignore_ascii_case(ext)))
}
