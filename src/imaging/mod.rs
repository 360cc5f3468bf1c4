//! Image handling: metadata preview and scrubbing.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Preview** | `kamadak-exif` container reader, filtered to an allow-list |
//! | **Scrub** | `image` decode → blank canvas → fresh encoder |
//!
//! The module is split into:
//! - **Formats**: MIME/extension mapping and encodable targets
//! - **Reader**: [`extract_metadata`], best effort, never fails
//! - **Scrubber**: [`scrub`], decode/re-encode with [`ScrubError`]
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod exif_reader;
pub mod formats;
pub mod rust_backend;
pub mod scrubber;

pub use backend::{ImageBackend, Metadata, ScrubError};
pub use exif_reader::{ALLOW_LIST, extract_metadata};
pub use formats::{OutputFormat, is_image_mime, mime_for_path, supported_extensions};
pub use rust_backend::RustBackend;
pub use scrubber::scrub;
