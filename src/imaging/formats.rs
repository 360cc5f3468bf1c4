//! MIME type and extension mapping.
//!
//! | Extension | MIME | Preview | Scrub |
//! |---|---|---|---|
//! | `jpg`, `jpeg` | `image/jpeg` | yes | JPEG, quality 100 |
//! | `png` | `image/png` | yes | PNG, lossless |
//! | `webp` | `image/webp` | yes | WebP, lossless |
//! | `heic`, `heif` | `image/heic`, `image/heif` | yes | no decoder, always a decode error |

use std::path::Path;

const EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
];

/// Extensions accepted when collecting uploads from a directory.
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    EXTENSIONS.iter().map(|(ext, _)| *ext)
}

/// MIME type for a file name, by extension (case-insensitive).
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    EXTENSIONS
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
}

/// Whether a declared MIME type names an image at all.
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// HEIC/HEIF containers: previewable, never decodable here.
pub fn is_heif_mime(mime_type: &str) -> bool {
    matches!(
        normalize(mime_type).as_str(),
        "image/heic" | "image/heif" | "image/heic-sequence" | "image/heif-sequence"
    )
}

/// Formats the scrubber can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        match normalize(mime_type).as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(OutputFormat::Jpeg),
            "image/png" => Some(OutputFormat::Png),
            "image/webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    /// Resolve the output format from the declared MIME type, falling back
    /// to the declared name when the MIME type carries no information.
    pub fn resolve(mime_type: &str, name: &str) -> Option<Self> {
        let mime = normalize(mime_type);
        if mime.is_empty() || mime == "application/octet-stream" {
            return mime_for_path(Path::new(name)).and_then(Self::from_mime);
        }
        Self::from_mime(&mime)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }
}

/// Lowercase, parameters (`; charset=…`) stripped.
fn normalize(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}
