//! Pure Rust backend: everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | EXIF preview | `kamadak-exif` via [`extract_metadata`](super::exif_reader::extract_metadata) |
//! | Decode (JPEG, PNG, WebP) | `image::ImageReader` with content-guessed format |
//! | Re-encode | `image` codecs via [`scrub`](super::scrubber::scrub) |
//!
//! HEIC/HEIF has no pure Rust decoder in this stack. Its EXIF preview still
//! works; scrubbing it always reports a decode error.

use super::backend::{ImageBackend, Metadata, ScrubError};
use super::{exif_reader, scrubber};

/// Backend built on the `image` and `kamadak-exif` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for RustBackend {
    fn read_metadata(&self, bytes: &[u8], mime_type: &str) -> Option<Metadata> {
        exif_reader::extract_metadata(bytes, mime_type)
    }

    fn scrub(&self, bytes: &[u8], mime_type: &str, name: &str) -> Result<Vec<u8>, ScrubError> {
        scrubber::scrub(bytes, mime_type, name)
    }
}
