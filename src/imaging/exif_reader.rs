//! EXIF preview extraction.
//!
//! Parses the EXIF tag directory with `kamadak-exif` (JPEG APP1, PNG `eXIf`,
//! WebP `EXIF`, TIFF, HEIF) and keeps only the tags worth showing before a
//! scrub. Everything is read from the primary image: IFD0 plus its Exif and
//! GPS sub-directories. The embedded thumbnail's IFD is ignored.
//!
//! A parse failure and a directory with no interesting tags both come back
//! as `None`. The caller cannot tell them apart, and should not need to.

use super::backend::Metadata;
use super::formats::is_image_mime;
use exif::{In, Reader, Tag, Value};
use std::io::Cursor;

/// Tags surfaced in the preview, paired with their display names.
pub const ALLOW_LIST: &[(Tag, &str)] = &[
    (Tag::Make, "Make"),
    (Tag::Model, "Model"),
    (Tag::Software, "Software"),
    (Tag::DateTime, "DateTime"),
    (Tag::GPSLatitude, "GPSLatitude"),
    (Tag::GPSLongitude, "GPSLongitude"),
    (Tag::Artist, "Artist"),
    (Tag::Copyright, "Copyright"),
    (Tag::ExifVersion, "ExifVersion"),
    (Tag::XResolution, "XResolution"),
    (Tag::YResolution, "YResolution"),
];

/// Read the allow-listed tags from an uploaded file.
///
/// Returns `None` without looking at the bytes when the declared type is not
/// an image.
pub fn extract_metadata(bytes: &[u8], mime_type: &str) -> Option<Metadata> {
    if !is_image_mime(mime_type) {
        return None;
    }

    match read_allow_listed(bytes) {
        Ok(tags) if !tags.is_empty() => Some(tags),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("no EXIF directory: {e}");
            None
        }
    }
}

/// Fallible parse; an empty map means the directory held nothing we show.
fn read_allow_listed(bytes: &[u8]) -> Result<Metadata, exif::Error> {
    let exif = Reader::new().read_from_container(&mut Cursor::new(bytes))?;

    let mut tags = Metadata::new();
    for (tag, name) in ALLOW_LIST {
        let Some(field) = exif.get_field(*tag, In::PRIMARY) else {
            continue;
        };
        if let Some(text) = render_value(&field.value) {
            tags.insert((*name).to_string(), text);
        }
    }
    Ok(tags)
}

/// Coerce a tag payload to display text. Empty payloads render as `None`.
pub(crate) fn render_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::Ascii(strings) => strings
            .iter()
            .map(|s| {
                String::from_utf8_lossy(s)
                    .trim_end_matches(['\0', ' ', '\t', '\n', '\r'])
                    .to_string()
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(","),
        Value::Byte(v) => join(v),
        Value::Short(v) => join(v),
        Value::Long(v) => join(v),
        Value::SByte(v) => join(v),
        Value::SShort(v) => join(v),
        Value::SLong(v) => join(v),
        Value::Float(v) => join(v),
        Value::Double(v) => join(v),
        Value::Rational(v) => v
            .iter()
            .map(|r| ratio(r.num as f64, r.denom as f64, r.num, r.denom))
            .collect::<Vec<_>>()
            .join(","),
        Value::SRational(v) => v
            .iter()
            .map(|r| ratio(r.num as f64, r.denom as f64, r.num, r.denom))
            .collect::<Vec<_>>()
            .join(","),
        Value::Undefined(bytes, _) => undefined_text(bytes),
        Value::Unknown(..) => String::new(),
    };

    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// `72/1` → `72`, `4608/100` → `46.08`; a zero denominator stays a fraction.
fn ratio<N: std::fmt::Display>(num: f64, denom: f64, raw_num: N, raw_denom: N) -> String {
    if denom == 0.0 {
        format!("{raw_num}/{raw_denom}")
    } else {
        (num / denom).to_string()
    }
}

/// Version-style payloads (`0230`) read as text; anything else as hex.
fn undefined_text(bytes: &[u8]) -> String {
    let trimmed: &[u8] = match bytes.iter().rposition(|b| *b != 0) {
        Some(last) => &bytes[..=last],
        None => &[],
    };
    if trimmed.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        String::from_utf8_lossy(trimmed).into_owned()
    } else {
        trimmed.iter().map(|b| format!("{b:02x}")).collect()
    }
}
