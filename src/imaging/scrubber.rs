//! Metadata removal by full decode and re-encode.
//!
//! Nothing here looks for EXIF segments or deletes tags. The source is
//! decoded to pixels, the pixels are copied onto a freshly allocated canvas
//! of the same size, and the canvas goes through an encoder that was never
//! handed anything but pixel data. Tag directories, ICC profiles, comments
//! and embedded thumbnails have no way into the output.
//!
//! | Target | Encoder | Setting |
//! |---|---|---|
//! | JPEG | `image::codecs::jpeg::JpegEncoder` | quality 100 |
//! | PNG | `image::codecs::png::PngEncoder` | lossless |
//! | WebP | `image::codecs::webp::WebPEncoder` | lossless |

use super::backend::ScrubError;
use super::formats::{OutputFormat, is_heif_mime};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{
    ColorType, DynamicImage, ExtendedColorType, GenericImage, ImageBuffer, ImageEncoder,
    ImageReader, Pixel,
};
use std::io::Cursor;

const JPEG_MAX_QUALITY: u8 = 100;

/// Produce a metadata-free copy of `bytes`, encoded as the declared type.
///
/// `name` is only consulted when `mime_type` is empty or generic.
pub fn scrub(bytes: &[u8], mime_type: &str, name: &str) -> Result<Vec<u8>, ScrubError> {
    if is_heif_mime(mime_type) {
        return Err(ScrubError::Decode(
            "HEIC/HEIF decoding is not supported".into(),
        ));
    }

    let decoded = decode(bytes)?;
    let format = OutputFormat::resolve(mime_type, name).ok_or_else(|| {
        ScrubError::Encode(format!("no encoder for declared type '{mime_type}'"))
    })?;

    let canvas = redraw(&decoded, format)?;
    let out = encode(&canvas, format)?;
    tracing::debug!(
        file = name,
        width = canvas.width(),
        height = canvas.height(),
        bytes_in = bytes.len(),
        bytes_out = out.len(),
        "scrubbed"
    );
    Ok(out)
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, ScrubError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ScrubError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| ScrubError::Decode(e.to_string()))
}

/// Pixel layouts the encoders accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Canvas {
    L8,
    La8,
    Rgb8,
    Rgba8,
    L16,
    La16,
    Rgb16,
    Rgba16,
}

fn canvas_for(color: ColorType, format: OutputFormat) -> Canvas {
    let grey = !color.has_color();
    let alpha = color.has_alpha();
    let deep = color.bytes_per_pixel() > color.channel_count();

    match format {
        // JPEG carries no alpha channel.
        OutputFormat::Jpeg if grey => Canvas::L8,
        OutputFormat::Jpeg => Canvas::Rgb8,
        OutputFormat::WebP => match (grey, alpha) {
            (true, false) => Canvas::L8,
            (true, true) => Canvas::La8,
            (false, false) => Canvas::Rgb8,
            (false, true) => Canvas::Rgba8,
        },
        OutputFormat::Png => match (grey, alpha, deep) {
            (true, false, false) => Canvas::L8,
            (true, true, false) => Canvas::La8,
            (false, false, false) => Canvas::Rgb8,
            (false, true, false) => Canvas::Rgba8,
            (true, false, true) => Canvas::L16,
            (true, true, true) => Canvas::La16,
            (false, false, true) => Canvas::Rgb16,
            (false, true, true) => Canvas::Rgba16,
        },
    }
}

/// Copy the decoded pixels onto a blank canvas of identical dimensions.
fn redraw(decoded: &DynamicImage, format: OutputFormat) -> Result<DynamicImage, ScrubError> {
    Ok(match canvas_for(decoded.color(), format) {
        Canvas::L8 => DynamicImage::ImageLuma8(copy_onto_blank(&decoded.to_luma8())?),
        Canvas::La8 => DynamicImage::ImageLumaA8(copy_onto_blank(&decoded.to_luma_alpha8())?),
        Canvas::Rgb8 => DynamicImage::ImageRgb8(copy_onto_blank(&decoded.to_rgb8())?),
        Canvas::Rgba8 => DynamicImage::ImageRgba8(copy_onto_blank(&decoded.to_rgba8())?),
        Canvas::L16 => DynamicImage::ImageLuma16(copy_onto_blank(&decoded.to_luma16())?),
        Canvas::La16 => DynamicImage::ImageLumaA16(copy_onto_blank(&decoded.to_luma_alpha16())?),
        Canvas::Rgb16 => DynamicImage::ImageRgb16(copy_onto_blank(&decoded.to_rgb16())?),
        Canvas::Rgba16 => DynamicImage::ImageRgba16(copy_onto_blank(&decoded.to_rgba16())?),
    })
}

fn copy_onto_blank<P: Pixel>(
    pixels: &ImageBuffer<P, Vec<P::Subpixel>>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>, ScrubError> {
    let mut canvas = ImageBuffer::new(pixels.width(), pixels.height());
    canvas
        .copy_from(pixels, 0, 0)
        .map_err(|e| ScrubError::Encode(e.to_string()))?;
    Ok(canvas)
}

fn encode(canvas: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>, ScrubError> {
    let (width, height) = (canvas.width(), canvas.height());
    let color: ExtendedColorType = canvas.color().into();
    let mut out = Vec::new();

    let written = match format {
        OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut out, JPEG_MAX_QUALITY)
            .write_image(canvas.as_bytes(), width, height, color),
        OutputFormat::Png => {
            PngEncoder::new(&mut out).write_image(canvas.as_bytes(), width, height, color)
        }
        OutputFormat::WebP => {
            WebPEncoder::new_lossless(&mut out).write_image(canvas.as_bytes(), width, height, color)
        }
    };
    written.map_err(|e| ScrubError::Encode(format!("{}: {e}", format.mime_type())))?;
    Ok(out)
}
