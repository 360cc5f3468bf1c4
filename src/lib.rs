//! # metaclean
//!
//! Strip identifying EXIF metadata from photos before they are shared. Every
//! image is decoded to raw pixels and re-encoded from those pixels alone, so
//! nothing from the original container (EXIF, XMP, IPTC, text chunks, ICC
//! profiles, thumbnails) survives into the cleaned copy.
//!
//! # Architecture: Inspect, Then Clean
//!
//! Work happens inside a [`session::Session`], which owns the files of one
//! batch and their lifecycle:
//!
//! ```text
//! 1. add_files    uploads  →  FileRecord (Pending, metadata preview)
//! 2. process_all  Pending  →  Completed(cleaned bytes) | Error(reason)
//! 3. download     Completed  →  cleaned_<name>, declared MIME type
//! ```
//!
//! Adding a file never decodes its pixels; it only reads the EXIF tags that
//! cleaning will remove so the user can see what is at stake. Processing is
//! where decode and re-encode happen, in parallel, with each file's outcome
//! independent of the others.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Batch lifecycle: ids, add/remove, parallel processing, downloads |
//! | [`types`] | `FileRecord`, `FileStatus`, `UploadedFile` and the JSON summary shape |
//! | [`imaging`] | EXIF reading, the scrubber, format tables and the backend trait |
//! | [`scan`] | Collects uploads from files and directories on disk |
//! | [`naming`] | `cleaned_` download names and output paths |
//! | [`config`] | Optional `config.toml`: output prefix, size ceiling, thread count |
//! | [`output`] | CLI output formatting for previews, progress and summaries |
//!
//! # Design Decisions
//!
//! ## Re-encode Instead of Surgery
//!
//! Removing metadata segment by segment requires knowing every place a format
//! can hide it. Re-encoding from decoded pixels needs no such list: the
//! encoders only ever receive width, height and samples. The price is that
//! JPEG output is a fresh lossy encode (at quality 100) rather than a
//! byte-preserving copy. PNG and WebP are written losslessly.
//!
//! ## Declared Type Wins
//!
//! The output format follows the MIME type the file was uploaded with, not
//! its sniffed content. A PNG uploaded as `image/jpeg` comes back as a JPEG.
//! The decoder still sniffs, so mislabelled inputs decode fine.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod scan;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
