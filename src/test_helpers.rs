//! Shared test fixtures for the metaclean test suite.
//!
//! Builds small synthetic images in memory and, where needed, splices a real
//! EXIF directory (written by `kamadak-exif`'s writer) into them:
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let jpeg = jpeg_with_exif(32, 24, &[ascii_field(Tag::Make, "Acme")]);
//! let meta = extract_metadata(&jpeg, "image/jpeg").unwrap();
//! assert_eq!(meta, metadata(&[("Make", "Acme")]));
//! ```

use crate::imaging::Metadata;
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Pixels
// =========================================================================

/// Deterministic RGB gradient so lossy round trips have structure to keep.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 128])
    })
}

pub fn plain_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

pub fn plain_png(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// RGBA PNG with a half-transparent right side.
pub fn rgba_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if x < width / 2 { 255 } else { 96 };
        image::Rgba([(x * 5 % 256) as u8, (y * 3 % 256) as u8, 40, alpha])
    });
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    out
}

// =========================================================================
// EXIF fields
// =========================================================================

pub fn ascii_field(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

pub fn short_field(tag: Tag, value: u16) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![value]),
    }
}

pub fn rational_field(tag: Tag, parts: &[(u32, u32)]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(
            parts
                .iter()
                .map(|&(num, denom)| Rational { num, denom })
                .collect(),
        ),
    }
}

/// Serialize fields into a bare TIFF-structured EXIF blob.
pub fn exif_blob(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).unwrap();
    buf.into_inner()
}

// =========================================================================
// Containers with EXIF
// =========================================================================

/// JPEG with an APP1 `Exif` segment right after SOI.
pub fn jpeg_with_exif(width: u32, height: u32, fields: &[Field]) -> Vec<u8> {
    let jpeg = plain_jpeg(width, height);
    let tiff = exif_blob(fields);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);
    let seg_len = u16::try_from(payload.len() + 2).unwrap();

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]); // SOI
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&seg_len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// PNG with an `eXIf` chunk right after IHDR.
pub fn png_with_exif(width: u32, height: u32, fields: &[Field]) -> Vec<u8> {
    png_with_chunk(&plain_png(width, height), b"eXIf", &exif_blob(fields))
}

/// Insert an ancillary chunk after IHDR (signature 8 bytes + IHDR 25 bytes).
pub fn png_with_chunk(png: &[u8], kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
    const AFTER_IHDR: usize = 8 + 25;

    let mut chunk = Vec::with_capacity(data.len() + 12);
    chunk.extend_from_slice(&u32::try_from(data.len()).unwrap().to_be_bytes());
    chunk.extend_from_slice(kind);
    chunk.extend_from_slice(data);
    let crc = crc32(&chunk[4..]);
    chunk.extend_from_slice(&crc.to_be_bytes());

    let mut out = png[..AFTER_IHDR].to_vec();
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&png[AFTER_IHDR..]);
    out
}

/// Extended-format WebP (VP8X header, lossless VP8L image) with an `EXIF`
/// chunk after the image data.
pub fn webp_with_exif(width: u32, height: u32, fields: &[Field]) -> Vec<u8> {
    let img = gradient(width, height);
    let mut simple = Vec::new();
    WebPEncoder::new_lossless(&mut simple)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    // RIFF header (12 bytes), then the encoder's single VP8L chunk.
    let image_chunk = &simple[12..];

    const EXIF_FLAG: u8 = 0x08;
    let mut vp8x = vec![EXIF_FLAG, 0, 0, 0];
    vp8x.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
    vp8x.extend_from_slice(&(height - 1).to_le_bytes()[..3]);

    let mut body = b"WEBP".to_vec();
    push_riff_chunk(&mut body, b"VP8X", &vp8x);
    body.extend_from_slice(image_chunk);
    push_riff_chunk(&mut body, b"EXIF", &exif_blob(fields));

    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&u32::try_from(body.len()).unwrap().to_le_bytes());
    out.extend_from_slice(&body);
    out
}

fn push_riff_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(kind);
    out.extend_from_slice(&u32::try_from(data.len()).unwrap().to_le_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in bytes {
        crc ^= b as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

// =========================================================================
// Assertions
// =========================================================================

pub fn metadata(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Decoded dimensions of an encoded image.
pub fn dimensions_of(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}

#[test]
fn webp_fixture_is_a_well_formed_riff() {
    let webp = webp_with_exif(6, 5, &[ascii_field(Tag::Make, "Acme")]);
    assert_eq!(&webp[..4], b"RIFF");
    assert_eq!(&webp[8..16], b"WEBPVP8X");
    let riff_len = u32::from_le_bytes(webp[4..8].try_into().unwrap()) as usize;
    assert_eq!(riff_len, webp.len() - 8);
    assert_eq!(dimensions_of(&webp), (6, 5));
}

#[test]
fn crc32_matches_known_iend_value() {
    // Every PNG ends with IEND whose CRC is fixed.
    assert_eq!(crc32(b"IEND"), 0xAE42_6082);
}
