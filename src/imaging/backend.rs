//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the session needs:
//! read the metadata preview and scrub. They are independent leaves; neither
//! calls the other.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests swap in a mock so
//! session logic can be exercised without encoding real images.

use std::collections::BTreeMap;
use thiserror::Error;

/// Allow-listed tag name → display string.
pub type Metadata = BTreeMap<String, String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrubError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Trait for image backends.
///
/// `Sync` so a single backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Read the allow-listed metadata preview. Never fails: anything that
    /// goes wrong reads as "nothing interesting".
    fn read_metadata(&self, bytes: &[u8], mime_type: &str) -> Option<Metadata>;

    /// Decode and re-encode into a fresh, metadata-free byte stream.
    fn scrub(&self, bytes: &[u8], mime_type: &str, name: &str) -> Result<Vec<u8>, ScrubError>;
}
