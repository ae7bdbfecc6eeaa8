//! Moving the EXIF payload in and out of image files.
//!
//! Only the EXIF segment/chunk is touched; every other segment of the file
//! is written back byte for byte.

use anyhow::{Context, Result};
use img_parts::jpeg::{Jpeg, JpegSegment};
use img_parts::png::Png;
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF};
use std::io::Cursor;
use std::path::Path;

const EXIF_PREFIX: &[u8] = b"Exif\0\0";
const APP1: u8 = 0xE1;

/// Image container formats that can carry an EXIF payload.
///
/// # Example
///
/// ```rust
/// use exif_edit::container::ImageKind;
/// use std::path::Path;
///
/// assert_eq!(ImageKind::from_path(Path::new("IMG_0001.JPG")), Some(ImageKind::Jpeg));
/// assert_eq!(ImageKind::from_path(Path::new("notes.txt")), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// JPEG, EXIF in an APP1 segment
    Jpeg,
    /// PNG, EXIF in an eXIf chunk
    Png,
    /// WebP, EXIF in a RIFF chunk
    WebP,
}

impl ImageKind {
    /// Determine the image kind from a file path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
            ImageKind::WebP => "WebP",
        }
    }
}

/// Extract the raw TIFF payload of the EXIF block, if the image has one.
pub fn extract_exif(bytes: &[u8], kind: ImageKind) -> Result<Option<Vec<u8>>> {
    let data = Bytes::copy_from_slice(bytes);
    let exif = match kind {
        ImageKind::Jpeg => parse_jpeg(data)?.exif(),
        ImageKind::Png => parse_png(data)?.exif(),
        ImageKind::WebP => parse_webp(data)?.exif(),
    };
    Ok(exif.map(|b| b.to_vec()).filter(|b| !b.is_empty()))
}

/// Replace the EXIF payload of an image, returning the new file bytes.
///
/// `None` removes the EXIF block.
pub fn replace_exif(bytes: &[u8], kind: ImageKind, tiff: Option<Vec<u8>>) -> Result<Vec<u8>> {
    let data = Bytes::copy_from_slice(bytes);
    let tiff = tiff.map(Bytes::from);

    let output = match kind {
        ImageKind::Jpeg => {
            let mut jpeg = parse_jpeg(data)?;
            let orig_pos = find_exif_segment_pos(jpeg.segments());
            jpeg.set_exif(tiff);

            // set_exif() inserts at a fixed position, which may land after
            // an XMP APP1. Put the EXIF segment back where it was (or right
            // after APP0) since many readers expect it first.
            if let Some(new_pos) = find_exif_segment_pos(jpeg.segments()) {
                let target_pos = orig_pos.unwrap_or(1);
                if target_pos < new_pos {
                    let segments = jpeg.segments_mut();
                    let seg = segments.remove(new_pos);
                    segments.insert(target_pos, seg);
                }
            }
            jpeg.encoder().bytes()
        }
        ImageKind::Png => {
            let mut png = parse_png(data)?;
            png.set_exif(tiff);
            png.encoder().bytes()
        }
        ImageKind::WebP => {
            let mut webp = parse_webp(data)?;
            webp.set_exif(tiff);
            webp.encoder().bytes()
        }
    };

    Ok(output.to_vec())
}

/// Pixel dimensions, read from the image header without decoding pixels.
pub fn dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("Failed to detect image format")?
        .into_dimensions()
        .context("Failed to read image dimensions")
}

fn parse_jpeg(data: Bytes) -> Result<Jpeg> {
    Jpeg::from_bytes(data).map_err(|e| anyhow::anyhow!("Failed to parse JPEG: {e}"))
}

fn parse_png(data: Bytes) -> Result<Png> {
    Png::from_bytes(data).map_err(|e| anyhow::anyhow!("Failed to parse PNG: {e}"))
}

fn parse_webp(data: Bytes) -> Result<WebP> {
    WebP::from_bytes(data).map_err(|e| anyhow::anyhow!("Failed to parse WebP: {e}"))
}

/// Find the position of the EXIF APP1 segment in a JPEG.
fn find_exif_segment_pos(segments: &[JpegSegment]) -> Option<usize> {
    segments
        .iter()
        .position(|s| s.marker() == APP1 && s.contents().starts_with(EXIF_PREFIX))
}
